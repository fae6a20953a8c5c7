use crate::CalcError;
use std::fmt::{self, Display, Formatter};

/// The four basic binary operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 4] = [
        ArithmeticOp::Add,
        ArithmeticOp::Subtract,
        ArithmeticOp::Multiply,
        ArithmeticOp::Divide,
    ];
}

impl Display for ArithmeticOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithmeticOp::Add => "Addition",
            ArithmeticOp::Subtract => "Subtraction",
            ArithmeticOp::Multiply => "Multiplication",
            ArithmeticOp::Divide => "Division",
        };

        f.write_str(name)
    }
}

/// Apply an [`ArithmeticOp`] to two operands.
///
/// Dividing by exactly zero is the only way this can fail.
pub fn arithmetic(op: ArithmeticOp, a: f64, b: f64) -> Result<f64, CalcError> {
    match op {
        ArithmeticOp::Add => Ok(a + b),
        ArithmeticOp::Subtract => Ok(a - b),
        ArithmeticOp::Multiply => Ok(a * b),
        ArithmeticOp::Divide if b == 0.0 => Err(CalcError::DivisionByZero),
        ArithmeticOp::Divide => Ok(a / b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let inputs = vec![
            (ArithmeticOp::Add, 1.5, 2.0, 3.5),
            (ArithmeticOp::Subtract, 1.0, 3.0, -2.0),
            (ArithmeticOp::Multiply, -4.0, 2.5, -10.0),
            (ArithmeticOp::Divide, 7.0, 2.0, 3.5),
            (ArithmeticOp::Divide, 0.0, -8.0, 0.0),
        ];

        for (op, a, b, should_be) in inputs {
            let got = arithmetic(op, a, b).unwrap();
            assert_eq!(got, should_be, "{} {} {}", a, op, b);
        }
    }

    #[test]
    fn division_matches_float_division() {
        for &(a, b) in &[(1.0, 3.0), (-2.5, 0.1), (1e300, 1e-10)] {
            assert_eq!(arithmetic(ArithmeticOp::Divide, a, b).unwrap(), a / b);
        }
    }

    #[test]
    fn divide_by_zero() {
        for &b in &[0.0, -0.0] {
            let got = arithmetic(ArithmeticOp::Divide, 5.0, b).unwrap_err();
            assert_eq!(got, CalcError::DivisionByZero);
        }
    }

    #[test]
    fn operation_names() {
        let names: Vec<_> =
            ArithmeticOp::ALL.iter().map(ToString::to_string).collect();

        assert_eq!(
            names,
            vec!["Addition", "Subtraction", "Multiplication", "Division"]
        );
    }
}
