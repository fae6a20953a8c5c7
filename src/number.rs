use nalgebra::{Complex, Normed};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// A real or complex result.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Number {
    Real(f64),
    Complex(Complex<f64>),
}

impl Number {
    /// Create a [`Number`], collapsing to [`Number::Real`] when the imaginary
    /// part is negligible compared to the value's magnitude.
    pub fn from_complex(value: Complex<f64>) -> Self {
        if value.im.abs() <= IMAGINARY_TOLERANCE * value.norm() {
            Number::Real(tidy(value.re))
        } else {
            Number::Complex(Complex::new(tidy(value.re), value.im))
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Number::Real(value) => Some(value),
            Number::Complex(_) => None,
        }
    }

    pub fn to_complex(&self) -> Complex<f64> {
        match *self {
            Number::Real(value) => Complex::new(value, 0.0),
            Number::Complex(value) => value,
        }
    }

    pub fn is_real(&self) -> bool { matches!(self, Number::Real(_)) }

    /// Real numbers come first in ascending order, followed by complex
    /// numbers ordered by their real then imaginary parts.
    pub(crate) fn solution_order(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Real(left), Number::Real(right)) => {
                left.partial_cmp(right).unwrap_or(Ordering::Equal)
            },
            (Number::Real(_), Number::Complex(_)) => Ordering::Less,
            (Number::Complex(_), Number::Real(_)) => Ordering::Greater,
            (Number::Complex(left), Number::Complex(right)) => left
                .re
                .partial_cmp(&right.re)
                .unwrap_or(Ordering::Equal)
                .then(
                    left.im.partial_cmp(&right.im).unwrap_or(Ordering::Equal),
                ),
        }
    }

    /// Are two numbers equal to within a relative `tolerance`?
    pub(crate) fn is_close_to(&self, other: &Number, tolerance: f64) -> bool {
        let (left, right) = (self.to_complex(), other.to_complex());
        let scale = left.norm().max(right.norm());

        (left - right).norm() <= tolerance * scale
    }
}

const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// Turn `-0.0` into `0.0` so it prints nicely.
fn tidy(value: f64) -> f64 { value + 0.0 }

impl From<f64> for Number {
    fn from(value: f64) -> Self { Number::Real(value) }
}

impl From<Complex<f64>> for Number {
    fn from(value: Complex<f64>) -> Self { Number::Complex(value) }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Number::Real(value) => write!(f, "{}", value),
            Number::Complex(value) if value.re == 0.0 => {
                write!(f, "{}i", value.im)
            },
            Number::Complex(value) if value.im < 0.0 => {
                write!(f, "{} - {}i", value.re, -value.im)
            },
            Number::Complex(value) => write!(f, "{} + {}i", value.re, value.im),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let inputs = vec![
            (Number::Real(120.0), "120"),
            (Number::Real(0.5), "0.5"),
            (Number::Real(f64::NAN), "NaN"),
            (Number::Complex(Complex::new(0.0, 1.0)), "1i"),
            (Number::Complex(Complex::new(-1.0, -2.0)), "-1 - 2i"),
            (Number::Complex(Complex::new(1.5, 2.0)), "1.5 + 2i"),
        ];

        for (number, should_be) in inputs {
            assert_eq!(number.to_string(), should_be);
        }
    }

    #[test]
    fn negligible_imaginary_parts_are_dropped() {
        assert_eq!(
            Number::from_complex(Complex::new(2.0, 1e-14)),
            Number::Real(2.0)
        );
        assert_eq!(
            Number::from_complex(Complex::new(-0.0, 0.0)).to_string(),
            "0"
        );
        assert!(!Number::from_complex(Complex::new(2.0, 0.5)).is_real());
    }

    #[test]
    fn small_values_keep_their_imaginary_part() {
        let got = Number::from_complex(Complex::new(0.0, 1e-10));
        assert_eq!(got, Number::Complex(Complex::new(0.0, 1e-10)));

        let got = Number::from_complex(Complex::new(1e-12, 1e-25));
        assert_eq!(got, Number::Real(1e-12));
    }

    #[test]
    fn closeness_is_relative() {
        let a = Number::Complex(Complex::new(0.0, 1e-10));
        let b = Number::Complex(Complex::new(0.0, -1e-10));
        assert!(!a.is_close_to(&b, 1e-6));

        assert!(Number::Real(1e10).is_close_to(&Number::Real(1e10 + 1.0), 1e-6));
        assert!(!Number::Real(1e-7).is_close_to(&Number::Real(2e-7), 1e-6));
        assert!(Number::Real(0.0).is_close_to(&Number::Real(0.0), 1e-6));
    }

    #[test]
    fn reals_sort_before_complex_numbers() {
        let mut numbers = vec![
            Number::Complex(Complex::new(0.0, 1.0)),
            Number::Real(3.0),
            Number::Complex(Complex::new(0.0, -1.0)),
            Number::Real(-1.0),
        ];

        numbers.sort_by(Number::solution_order);

        assert_eq!(
            numbers,
            vec![
                Number::Real(-1.0),
                Number::Real(3.0),
                Number::Complex(Complex::new(0.0, -1.0)),
                Number::Complex(Complex::new(0.0, 1.0)),
            ]
        );
    }
}
