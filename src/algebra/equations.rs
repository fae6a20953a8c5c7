use crate::algebra::{
    ops::{self, Context},
    Expression, Parameter, ParseError,
};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An equality between two [`Expression`]s, stored as `left - right = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    left: Expression,
    right: Expression,
    pub(crate) body: Expression,
}

impl Equation {
    pub fn new(left: Expression, right: Expression) -> Self {
        let body = left.clone() - right.clone();
        Equation { left, right, body }
    }

    pub fn left(&self) -> &Expression { &self.left }

    pub fn right(&self) -> &Expression { &self.right }

    /// The expression which is zero whenever the equation holds.
    pub fn body(&self) -> &Expression { &self.body }

    /// Every distinct [`Parameter`] that isn't one of the [`Context`]'s
    /// named constants, sorted by name.
    pub fn unknowns<C>(&self, ctx: &C) -> Vec<Parameter>
    where
        C: Context,
    {
        let mut unknowns: Vec<_> = self
            .body
            .params()
            .filter(|p| ctx.constant(p.name()).is_none())
            .cloned()
            .collect();
        unknowns.sort();
        unknowns.dedup();

        unknowns
    }

    /// Replace named constants (`pi`, `e`, ...) with their values and
    /// simplify.
    pub(crate) fn normalized_body<C>(&self, ctx: &C) -> Expression
    where
        C: Context,
    {
        let bound = ops::bind_constants(&self.body, ctx);
        ops::fold_constants(&bound, ctx)
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// Why some text couldn't be turned into an [`Equation`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquationError {
    #[error("an equation needs an \"=\" sign")]
    MissingEquals,
    #[error("an equation needs exactly one \"=\" sign but {count} were found")]
    TooManyEquals { count: usize },
    #[error("unable to parse the {side} side of the equation")]
    Parse {
        side: Side,
        #[source]
        inner: ParseError,
    },
}

/// One side of an [`Equation`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Equation {
    type Err = EquationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s.find('=').ok_or(EquationError::MissingEquals)?;
        let (left, right) = s.split_at(index);
        let right = &right[1..];

        if right.contains('=') {
            return Err(EquationError::TooManyEquals {
                count: s.matches('=').count(),
            });
        }

        let left = left.parse().map_err(|inner| EquationError::Parse {
            side: Side::Left,
            inner,
        })?;
        let right = right.parse().map_err(|inner| EquationError::Parse {
            side: Side::Right,
            inner,
        })?;

        Ok(Equation::new(left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::ops::Builtins;

    #[test]
    fn split_on_the_equals_sign() {
        let equation: Equation = "x**2 - 4 = 0".parse().unwrap();

        assert_eq!(equation.left().to_string(), "x**2 - 4");
        assert_eq!(equation.right().to_string(), "0");
        assert_eq!(equation.to_string(), "x**2 - 4 = 0");
        assert_eq!(equation.body().to_string(), "x**2 - 4 - 0");
    }

    #[test]
    fn equations_need_exactly_one_equals_sign() {
        let inputs = vec![
            ("x + 1", EquationError::MissingEquals),
            ("x == 1", EquationError::TooManyEquals { count: 2 }),
            ("x = 1 = 2", EquationError::TooManyEquals { count: 2 }),
        ];

        for (src, should_be) in inputs {
            let got = src.parse::<Equation>().unwrap_err();
            assert_eq!(got, should_be, "{:?}", src);
        }
    }

    #[test]
    fn report_which_side_failed_to_parse() {
        let got = "= x".parse::<Equation>().unwrap_err();

        assert_eq!(
            got,
            EquationError::Parse {
                side: Side::Left,
                inner: ParseError::UnexpectedEndOfInput
            }
        );

        let got = "x = 2 +".parse::<Equation>().unwrap_err();

        assert_eq!(
            got,
            EquationError::Parse {
                side: Side::Right,
                inner: ParseError::UnexpectedEndOfInput
            }
        );
    }

    #[test]
    fn constants_are_not_unknowns() {
        let equation: Equation = "sin(x) = pi*y - x".parse().unwrap();

        let got = equation.unknowns(&Builtins);

        assert_eq!(got, vec![Parameter::named("x"), Parameter::named("y")]);
    }

    #[test]
    fn normalizing_binds_and_folds_constants() {
        let equation: Equation = "2*x = pi - pi".parse().unwrap();

        let got = equation.normalized_body(&Builtins);

        assert_eq!(got.to_string(), "2*x");
    }
}
