use crate::{evaluate::ExpressionError, solve::SolveError};

/// Everything that can go wrong when dispatching a calculation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Invalid base {base}, the base must be positive and not equal to 1")]
    InvalidBase { base: f64 },
    #[error("Factorial is defined for non-negative integers, not {value}")]
    NonIntegerOrNegative { value: f64 },
    #[error("Factorial of {value} is too large")]
    Overflow { value: f64 },
    #[error("n must be greater than or equal to k (n = {n}, k = {k})")]
    NGreaterEqualKViolation { n: f64, k: f64 },
    #[error("{operation} takes {expected} operand(s) but {found} were provided")]
    Arity {
        operation: crate::ScientificOp,
        expected: usize,
        found: usize,
    },
    #[error("Unable to evaluate the expression: {0}")]
    Expression(#[from] ExpressionError),
    #[error("Unable to solve the equation: {0}")]
    EquationSolveFailure(#[from] SolveError),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::DivisionByZero => ErrorKind::DivisionByZero,
            CalcError::InvalidBase { .. } => ErrorKind::InvalidBase,
            CalcError::NonIntegerOrNegative { .. } => {
                ErrorKind::NonIntegerOrNegative
            },
            CalcError::Overflow { .. } => ErrorKind::Overflow,
            CalcError::NGreaterEqualKViolation { .. } => {
                ErrorKind::NGreaterEqualKViolation
            },
            CalcError::Arity { .. } => ErrorKind::Arity,
            CalcError::Expression(_) => ErrorKind::Expression,
            CalcError::EquationSolveFailure(_) => {
                ErrorKind::EquationSolveFailure
            },
        }
    }
}

/// The category of a [`CalcError`], without any of its details.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DivisionByZero,
    InvalidBase,
    NonIntegerOrNegative,
    Overflow,
    NGreaterEqualKViolation,
    Arity,
    Expression,
    EquationSolveFailure,
}
