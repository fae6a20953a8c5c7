//! The computation engine behind a scientific calculator.
//!
//! Every calculation is a pure function which either produces a number (or a
//! set of numbers) or a [`CalcError`]:
//!
//! - [`arithmetic()`] for the four basic operations
//! - [`scientific()`] for roots, powers, logarithms, trigonometry (in
//!   degrees), factorials and friends
//! - [`convert()`] for length, weight and temperature units
//! - [`evaluate_expression()`] and [`graph::sample()`] for free-form
//!   expressions in `x`
//! - [`solve_equation()`] for finding every `x` (real or complex) that
//!   satisfies an equation
//!
//! A [`Session`] ties these together and keeps a [`History`] of what was
//! calculated.
//!
//! ```rust
//! use calcengine::{Number, Session, ScientificOp};
//!
//! let mut session = Session::new();
//!
//! let got = session.scientific(ScientificOp::Factorial, &[5.0]);
//! assert_eq!(got.as_numeric(), Some(Number::Real(120.0)));
//!
//! let got = session.solve_equation("x**2 - 4 = 0");
//! assert_eq!(got.to_string(), "[-2, 2]");
//!
//! assert_eq!(session.history().len(), 2);
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod arithmetic;
mod convert;
mod error;
mod evaluate;
pub mod graph;
mod history;
mod number;
mod result;
mod scientific;
mod session;
mod solve;

pub use algebra::ops;
pub use arithmetic::{arithmetic, ArithmeticOp};
pub use convert::{
    convert, ConversionCategory, ConversionRule, ConversionTable,
};
pub use error::{CalcError, ErrorKind};
pub use evaluate::{
    evaluate_at, evaluate_expression, CompiledExpression, ExpressionError,
};
pub use history::{History, HistoryEntry};
pub use number::Number;
pub use result::OperationResult;
pub use scientific::{scientific, ScientificOp};
pub use session::Session;
pub use solve::{
    solve, solve_equation, solve_equation_with, Solution, SolveError,
    SolverOptions, Strategy, UNKNOWN,
};
