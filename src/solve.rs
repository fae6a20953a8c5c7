//! Solving a single equation for `x`.

use nalgebra::Normed;
use crate::{
    algebra::{
        ops::{self, Builtins, Context, EvaluationError},
        Equation, EquationError, Expression, Parameter, Polynomial,
    },
    Number,
};
use tracing::{debug, trace};

/// The variable every equation is solved for.
pub const UNKNOWN: &str = "x";

/// Solve an equation like `"x**2 - 4 = 0"` for `x` using the builtin
/// functions and default [`SolverOptions`].
pub fn solve_equation(src: &str) -> Result<Vec<Number>, SolveError> {
    solve_equation_with(src, &Builtins, &SolverOptions::default())
        .map(|solution| solution.roots)
}

/// Parse and solve an equation for `x`.
pub fn solve_equation_with<C>(
    src: &str,
    ctx: &C,
    options: &SolverOptions,
) -> Result<Solution, SolveError>
where
    C: Context,
{
    let equation: Equation = src.parse()?;
    solve(&equation, &Parameter::named(UNKNOWN), ctx, options)
}

/// Knobs for tuning the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// How many Newton iterations to try from each seed.
    pub max_iterations: usize,
    /// Relative change between iterations below which Newton's method has
    /// converged.
    pub tolerance: f64,
    /// How close to zero the equation must be at a converged root.
    pub residual_tolerance: f64,
    /// Initial guesses for Newton's method.
    pub seeds: Vec<f64>,
    /// The largest polynomial solved via its companion matrix.
    pub max_polynomial_degree: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_iterations: 50,
            tolerance: 1e-12,
            residual_tolerance: 1e-9,
            seeds: vec![0.0, 1.0, -1.0, 2.5, -2.5, 5.0, -5.0, 10.0, -10.0],
            max_polynomial_degree: 64,
        }
    }
}

/// The roots of an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub roots: Vec<Number>,
    pub strategy: Strategy,
}

/// How a [`Solution`] was found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The equation was a polynomial and every root was found.
    Polynomial { degree: usize },
    /// Real roots found iteratively from [`SolverOptions::seeds`].
    Newton,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Equation(#[from] EquationError),
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvaluationError),
    #[error("The solution didn't converge")]
    DidntConverge,
    #[error("No solution found")]
    NoSolution,
}

/// Solve an [`Equation`] for `unknown`.
///
/// Polynomials are solved exactly (up to floating point error) over the
/// complex numbers. Anything else falls back to Newton's method, which only
/// finds real roots reachable from [`SolverOptions::seeds`].
pub fn solve<C>(
    equation: &Equation,
    unknown: &Parameter,
    ctx: &C,
    options: &SolverOptions,
) -> Result<Solution, SolveError>
where
    C: Context,
{
    if let Some(other) = equation.unknowns(ctx).into_iter().find(|p| p != unknown)
    {
        return Err(EvaluationError::UnknownParameter {
            name: other.name().into(),
        }
        .into());
    }

    if let Some(name) =
        equation.body().functions().find(|f| !ctx.is_known_function(f))
    {
        return Err(EvaluationError::UnknownFunction { name: name.into() }.into());
    }

    let body = equation.normalized_body(ctx);

    if let Some(poly) = Polynomial::from_expression(
        &body,
        unknown,
        ctx,
        options.max_polynomial_degree,
    ) {
        let degree = poly.degree();
        debug!(%equation, degree, "Solving as a polynomial");

        let roots = poly.roots().ok_or(SolveError::DidntConverge)?;
        return Ok(Solution {
            roots,
            strategy: Strategy::Polynomial { degree },
        });
    }

    debug!(%equation, "Falling back to Newton's method");
    let derivative = ops::partial_derivative(&body, unknown, ctx)?;
    let derivative = ops::fold_constants(&derivative, ctx);

    let mut roots = Vec::new();

    for &seed in &options.seeds {
        match newtons_method(&body, &derivative, unknown, seed, ctx, options) {
            Ok(root) => roots.push(Number::Real(root + 0.0)),
            Err(e) => debug!(seed, error = %e, "Seed didn't lead to a root"),
        }
    }

    if roots.is_empty() {
        return Err(SolveError::DidntConverge);
    }

    // Newton's method only pins a root down to within `options.tolerance`,
    // so anything closer than that is the same root
    roots.sort_by(Number::solution_order);
    roots.dedup_by(|a, b| {
        (a.to_complex() - b.to_complex()).norm() <= options.tolerance
            || a.is_close_to(b, DUPLICATE_ROOT_TOLERANCE)
    });

    Ok(Solution {
        roots,
        strategy: Strategy::Newton,
    })
}

const DUPLICATE_ROOT_TOLERANCE: f64 = 1e-6;

/// Find a root of `f` iteratively using Newton's method.
///
/// The iterative equation for Newton's method is:
///
/// ```text
///  x_next = x_current - f(x_current) / f'(x_current)
/// ```
///
/// where `f'` is calculated symbolically ahead of time. Iteration stops once
/// successive values agree to within [`SolverOptions::tolerance`], after
/// which the residual is checked to make sure we actually found a root and
/// not just a very flat region.
///
/// See also:
///
/// - https://en.wikipedia.org/wiki/Newton%27s_method
fn newtons_method<C>(
    f: &Expression,
    f_dash: &Expression,
    unknown: &Parameter,
    initial_value: f64,
    ctx: &C,
    options: &SolverOptions,
) -> Result<f64, SolveError>
where
    C: Context,
{
    let mut x = initial_value;

    for iteration in 0..options.max_iterations {
        let f_of_x = evaluate_at(f, unknown, x, ctx)?;
        let slope = evaluate_at(f_dash, unknown, x, ctx)?;
        let x_next = step_newtons_method(x, f_of_x, slope)?;
        trace!(iteration, x, x_next, "Newton step");

        if approx::relative_eq!(
            x_next,
            x,
            epsilon = options.tolerance,
            max_relative = options.tolerance
        ) {
            let residual = evaluate_at(f, unknown, x_next, ctx)?;

            return if residual.abs() <= options.residual_tolerance {
                Ok(x_next)
            } else {
                Err(SolveError::NoSolution)
            };
        }

        x = x_next;
    }

    Err(SolveError::DidntConverge)
}

fn step_newtons_method(
    x: f64,
    f_of_x: f64,
    slope: f64,
) -> Result<f64, SolveError> {
    if slope == 0.0 {
        return Err(SolveError::NoSolution);
    }

    let x_next = x - f_of_x / slope;

    if x_next.is_finite() {
        Ok(x_next)
    } else {
        Err(SolveError::DidntConverge)
    }
}

fn evaluate_at<C>(
    expr: &Expression,
    unknown: &Parameter,
    value: f64,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    C: Context,
{
    let lookup = |p: &Parameter| if p == unknown { Some(value) } else { None };
    ops::evaluate(expr, &lookup, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{ParseError, Side};
    use nalgebra::Complex;

    #[test]
    fn single_equality() {
        let got = solve_equation("x = 5").unwrap();

        assert_eq!(got, vec![Number::Real(5.0)]);
    }

    #[test]
    fn solve_a_quadratic() {
        let got =
            solve_equation_with("x**2 - 4 = 0", &Builtins, &SolverOptions::default())
                .unwrap();

        assert_eq!(got.roots, vec![Number::Real(-2.0), Number::Real(2.0)]);
        assert_eq!(got.strategy, Strategy::Polynomial { degree: 2 });
    }

    #[test]
    fn unknowns_on_both_sides() {
        let got = solve_equation("2*x + 1 = x - 3").unwrap();

        assert_eq!(got, vec![Number::Real(-4.0)]);
    }

    #[test]
    fn complex_solutions() {
        let got = solve_equation("x**2 = -1").unwrap();

        assert_eq!(
            got,
            vec![
                Number::Complex(Complex::new(0.0, -1.0)),
                Number::Complex(Complex::new(0.0, 1.0)),
            ]
        );
    }

    #[test]
    fn constants_are_bound_before_solving() {
        let got = solve_equation("x/pi = 2").unwrap();

        assert_eq!(got.len(), 1);
        assert!(got[0].is_close_to(
            &Number::Real(2.0 * std::f64::consts::PI),
            1e-12
        ));
    }

    #[test]
    fn equations_without_unknowns_have_no_solutions() {
        assert_eq!(solve_equation("4 = 4").unwrap(), Vec::<Number>::new());
        assert_eq!(solve_equation("1 = 2").unwrap(), Vec::<Number>::new());
    }

    #[test]
    fn tiny_coefficients_arent_ignored() {
        let got = solve_equation("1e-7*x = 1").unwrap();
        assert_eq!(got.len(), 1);
        assert!(got[0].is_close_to(&Number::Real(1e7), 1e-12), "{:?}", got);

        let got = solve_equation("x + 1e-7 = 0").unwrap();
        assert_eq!(got.len(), 1);
        assert!(got[0].is_close_to(&Number::Real(-1e-7), 1e-12), "{:?}", got);

        let got = solve_equation("1.0000001*x = 1.0000001").unwrap();
        assert_eq!(got.len(), 1);
        assert!(got[0].is_close_to(&Number::Real(1.0), 1e-12), "{:?}", got);
    }

    #[test]
    fn badly_scaled_polynomials() {
        let got = solve_equation("1e-20*x**2 = 1").unwrap();
        assert_eq!(got.len(), 2, "{:?}", got);
        assert!(got[0].is_close_to(&Number::Real(-1e10), 1e-12));
        assert!(got[1].is_close_to(&Number::Real(1e10), 1e-12));

        let got = solve_equation("x**2 + 1e-20 = 0").unwrap();
        assert_eq!(got.len(), 2, "{:?}", got);
        assert!(got[0].is_close_to(&Complex::new(0.0, -1e-10).into(), 1e-12));
        assert!(got[1].is_close_to(&Complex::new(0.0, 1e-10).into(), 1e-12));
    }

    #[test]
    fn repeated_roots_are_reported_once() {
        let inputs = vec![
            ("(x - 1)**3 = 0", 1.0),
            ("(x - 2)**5 = 0", 2.0),
            ("x**3 - 3*x**2 + 3*x = 1", 1.0),
        ];

        for (src, should_be) in inputs {
            let got = solve_equation(src).unwrap();

            assert_eq!(got.len(), 1, "{} gave {:?}", src, got);
            assert!(
                got[0].is_close_to(&Number::Real(should_be), 1e-9),
                "{} gave {:?}",
                src,
                got
            );
        }
    }

    #[test]
    fn transcendental_equations_use_newtons_method() {
        let solution =
            solve_equation_with("exp(x) = 2", &Builtins, &SolverOptions::default())
                .unwrap();

        assert_eq!(solution.strategy, Strategy::Newton);
        assert_eq!(solution.roots.len(), 1);
        let root = solution.roots[0].as_real().unwrap();
        assert!(approx::relative_eq!(root, 2_f64.ln(), epsilon = 1e-9));
    }

    #[test]
    fn every_newton_root_satisfies_the_equation() {
        let got = solve_equation("sin(x) = 0.5").unwrap();

        assert!(!got.is_empty());
        assert!(got
            .iter()
            .any(|root| root.is_close_to(&Number::Real(0.5235987755982989), 1e-9)));
        for root in got {
            let x = root.as_real().unwrap();
            assert!((x.sin() - 0.5).abs() < 1e-9, "sin({}) != 0.5", x);
        }
    }

    #[test]
    fn no_root_means_failure() {
        let got = solve_equation("abs(x) = -1").unwrap_err();

        assert_eq!(got, SolveError::DidntConverge);
    }

    #[test]
    fn malformed_equations() {
        let inputs = vec![
            ("x + 1", SolveError::Equation(EquationError::MissingEquals)),
            (
                "x = 1 = 2",
                SolveError::Equation(EquationError::TooManyEquals { count: 2 }),
            ),
            (
                "x + = 2",
                SolveError::Equation(EquationError::Parse {
                    side: Side::Left,
                    inner: ParseError::UnexpectedEndOfInput,
                }),
            ),
            (
                "x + y = 1",
                SolveError::Eval(EvaluationError::UnknownParameter {
                    name: "y".into(),
                }),
            ),
            (
                "foo(x) = 1",
                SolveError::Eval(EvaluationError::UnknownFunction {
                    name: "foo".into(),
                }),
            ),
        ];

        for (src, should_be) in inputs {
            let got = solve_equation(src).unwrap_err();
            assert_eq!(got, should_be, "{:?}", src);
        }
    }

    #[test]
    fn step_once() {
        // f(x) = x**2 - 2, starting at x = 1
        let got = step_newtons_method(1.0, -1.0, 2.0).unwrap();

        assert_eq!(got, 1.5);
        assert_eq!(
            step_newtons_method(1.0, 1.0, 0.0).unwrap_err(),
            SolveError::NoSolution
        );
    }
}
