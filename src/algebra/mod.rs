//! The symbolic algebra system.

mod equations;
mod expr;
pub mod ops;
mod parse;
mod poly;

pub use equations::{Equation, EquationError, Side};
pub use expr::{BinaryOperation, Expression, Parameter};
pub use parse::{parse, ParseError, TokenKind};
pub use poly::Polynomial;
