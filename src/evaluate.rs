//! Evaluating free-form expressions in `x`.

use crate::{
    algebra::{
        ops::{self, Builtins, Context, EvaluationError},
        Expression, Parameter, ParseError,
    },
    solve::UNKNOWN,
};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("invalid syntax: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// An expression which has been parsed and checked once so it can be
/// evaluated at many points.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression<C = Builtins> {
    expression: Expression,
    x: Parameter,
    ctx: C,
}

impl CompiledExpression<Builtins> {
    pub fn new(src: &str) -> Result<Self, ExpressionError> {
        CompiledExpression::with_context(src, Builtins)
    }
}

impl<C: Context> CompiledExpression<C> {
    /// Parse `src`, making sure the only variable is `x` and every function
    /// is one `ctx` knows about.
    pub fn with_context(src: &str, ctx: C) -> Result<Self, ExpressionError> {
        let expression: Expression = src.parse()?;
        let x = Parameter::named(UNKNOWN);

        if let Some(unknown) = expression
            .params()
            .find(|&p| p != &x && ctx.constant(p.name()).is_none())
        {
            return Err(EvaluationError::UnknownParameter {
                name: unknown.name().into(),
            }
            .into());
        }

        if let Some(name) =
            expression.functions().find(|f| !ctx.is_known_function(f))
        {
            return Err(
                EvaluationError::UnknownFunction { name: name.into() }.into()
            );
        }

        let expression =
            ops::fold_constants(&ops::bind_constants(&expression, &ctx), &ctx);

        Ok(CompiledExpression { expression, x, ctx })
    }

    /// The expression after named constants have been substituted in and
    /// simplified.
    pub fn expression(&self) -> &Expression { &self.expression }

    /// Does the value change with `x`?
    pub fn depends_on_x(&self) -> bool { self.expression.depends_on(&self.x) }

    pub fn evaluate(&self, x: f64) -> Result<f64, ExpressionError> {
        let lookup = |p: &Parameter| if *p == self.x { Some(x) } else { None };

        ops::evaluate(&self.expression, &lookup, &self.ctx).map_err(Into::into)
    }

    /// Evaluate the expression at every value in `xs`.
    ///
    /// An expression that doesn't mention `x` is evaluated once and repeated
    /// so the output always lines up with the input.
    pub fn evaluate_all(&self, xs: &[f64]) -> Result<Vec<f64>, ExpressionError> {
        if !self.depends_on_x() {
            let nothing = |_: &Parameter| None;
            let value = ops::evaluate(&self.expression, &nothing, &self.ctx)?;
            return Ok(vec![value; xs.len()]);
        }

        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

impl<C> Display for CompiledExpression<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// Evaluate `src` at each of the `xs`.
pub fn evaluate_expression(
    src: &str,
    xs: &[f64],
) -> Result<Vec<f64>, ExpressionError> {
    CompiledExpression::new(src)?.evaluate_all(xs)
}

/// Evaluate `src` at a single point.
pub fn evaluate_at(src: &str, x: f64) -> Result<f64, ExpressionError> {
    CompiledExpression::new(src)?.evaluate(x)
}
