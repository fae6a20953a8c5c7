//! Sampling an expression so it can be plotted.

use crate::{
    algebra::ops::{Builtins, Context},
    evaluate::{CompiledExpression, ExpressionError},
};

/// The range of `x` values a graph covers.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOptions {
    pub x_min: f64,
    pub x_max: f64,
    pub samples: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            x_min: -10.0,
            x_max: 10.0,
            samples: 400,
        }
    }
}

/// The points of a graph, ready to hand to something that draws them.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub expression: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Plot {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// `samples` evenly spaced values from `start` to `end`, inclusive.
pub fn linspace(start: f64, end: f64, samples: usize) -> Vec<f64> {
    match samples {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (samples - 1) as f64;
            let mut values: Vec<f64> =
                (0..samples).map(|i| start + step * i as f64).collect();
            // avoid accumulating rounding error at the last point
            values[samples - 1] = end;
            values
        },
    }
}

/// Evaluate `expression` across the range in `options`.
pub fn sample(
    expression: &str,
    options: &GraphOptions,
) -> Result<Plot, ExpressionError> {
    sample_with(expression, Builtins, options)
}

/// Evaluate `expression` across the range in `options`, using a custom
/// [`Context`] for function calls.
pub fn sample_with<C: Context>(
    expression: &str,
    ctx: C,
    options: &GraphOptions,
) -> Result<Plot, ExpressionError> {
    let compiled = CompiledExpression::with_context(expression, ctx)?;
    let xs = linspace(options.x_min, options.x_max, options.samples);
    let ys = compiled.evaluate_all(&xs)?;

    Ok(Plot {
        expression: expression.to_string(),
        xs,
        ys,
    })
}
