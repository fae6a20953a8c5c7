use crate::{CalcError, Number};
use std::fmt::{self, Display, Formatter};

/// The outcome of a single calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    Numeric(Number),
    /// Every solution of an equation, possibly none.
    SymbolicSet(Vec<Number>),
    Error(CalcError),
}

impl OperationResult {
    pub fn is_error(&self) -> bool { matches!(self, OperationResult::Error(_)) }

    pub fn as_numeric(&self) -> Option<Number> {
        match self {
            OperationResult::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CalcError> {
        match self {
            OperationResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for OperationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OperationResult::Numeric(n) => write!(f, "{}", n),
            OperationResult::SymbolicSet(solutions) => {
                write!(f, "[")?;
                for (i, solution) in solutions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", solution)?;
                }
                write!(f, "]")
            },
            OperationResult::Error(e) => write!(f, "Error: {}", e),
        }
    }
}

impl From<f64> for OperationResult {
    fn from(value: f64) -> Self { OperationResult::Numeric(Number::Real(value)) }
}

impl From<Number> for OperationResult {
    fn from(value: Number) -> Self { OperationResult::Numeric(value) }
}

impl From<Vec<Number>> for OperationResult {
    fn from(solutions: Vec<Number>) -> Self {
        OperationResult::SymbolicSet(solutions)
    }
}

impl From<CalcError> for OperationResult {
    fn from(e: CalcError) -> Self { OperationResult::Error(e) }
}

impl<T, E> From<Result<T, E>> for OperationResult
where
    T: Into<OperationResult>,
    E: Into<CalcError>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(e) => OperationResult::Error(e.into()),
        }
    }
}
