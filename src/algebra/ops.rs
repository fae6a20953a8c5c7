//! [`Expression`] operations.

use crate::algebra::{BinaryOperation, Expression, Parameter};
use euclid::approxeq::ApproxEq;
use smol_str::SmolStr;
use std::f64::consts;

/// Contextual information used when evaluating an [`Expression`].
pub trait Context {
    fn evaluate_function(
        &self,
        name: &str,
        arguments: &[f64],
    ) -> Result<f64, EvaluationError>;

    /// For some [`Parameter`], `x`, and function, `f`, get `f'(x)`.
    fn differentiate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError>;

    /// Is `name` something [`Context::evaluate_function()`] understands?
    fn is_known_function(&self, _name: &str) -> bool { true }

    /// Look up a named constant (e.g. `pi`).
    fn constant(&self, _name: &str) -> Option<f64> { None }
}

impl<C: Context + ?Sized> Context for &C {
    fn evaluate_function(
        &self,
        name: &str,
        arguments: &[f64],
    ) -> Result<f64, EvaluationError> {
        (**self).evaluate_function(name, arguments)
    }

    fn differentiate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError> {
        (**self).differentiate_function(name, param)
    }

    fn is_known_function(&self, name: &str) -> bool {
        (**self).is_known_function(name)
    }

    fn constant(&self, name: &str) -> Option<f64> { (**self).constant(name) }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("unknown function \"{name}\"")]
    UnknownFunction { name: SmolStr },
    #[error("unknown variable \"{name}\"")]
    UnknownParameter { name: SmolStr },
    #[error("{name}() expects {expected} argument(s) but was given {found}")]
    WrongArity {
        name: SmolStr,
        expected: usize,
        found: usize,
    },
    #[error("math domain error in {name}")]
    Domain { name: SmolStr },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unable to differentiate \"{name}\"")]
    UnableToDifferentiate { name: SmolStr },
}

/// The set of builtin functions and constants.
///
/// Angles are in radians. Names may carry a `np.`, `numpy.` or `math.`
/// prefix, so `np.sin(x)` and `sin(x)` mean the same thing.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins;

impl Builtins {
    fn canonical_name(name: &str) -> &str {
        ["np.", "numpy.", "math."]
            .iter()
            .find_map(|prefix| name.strip_prefix(*prefix))
            .unwrap_or(name)
    }

    fn arity(name: &str) -> Option<usize> {
        match name {
            "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "arcsin"
            | "arccos" | "arctan" | "sinh" | "cosh" | "tanh" | "exp" | "log"
            | "ln" | "log10" | "log2" | "sqrt" | "abs" => Some(1),
            "pow" | "power" => Some(2),
            _ => None,
        }
    }
}

impl Context for Builtins {
    fn evaluate_function(
        &self,
        name: &str,
        arguments: &[f64],
    ) -> Result<f64, EvaluationError> {
        let canonical = Builtins::canonical_name(name);
        let expected = Builtins::arity(canonical)
            .ok_or_else(|| EvaluationError::UnknownFunction {
                name: name.into(),
            })?;

        if arguments.len() != expected {
            return Err(EvaluationError::WrongArity {
                name: name.into(),
                expected,
                found: arguments.len(),
            });
        }

        let x = arguments[0];

        let value = match canonical {
            "sin" => x.sin(),
            "cos" => x.cos(),
            "tan" => x.tan(),
            "asin" | "arcsin" => x.asin(),
            "acos" | "arccos" => x.acos(),
            "atan" | "arctan" => x.atan(),
            "sinh" => x.sinh(),
            "cosh" => x.cosh(),
            "tanh" => x.tanh(),
            "exp" => x.exp(),
            "log" | "ln" => x.ln(),
            "log10" => x.log10(),
            "log2" => x.log2(),
            "sqrt" => x.sqrt(),
            "abs" => x.abs(),
            "pow" | "power" => x.powf(arguments[1]),
            _ => {
                return Err(EvaluationError::UnknownFunction {
                    name: name.into(),
                })
            },
        };

        Ok(value)
    }

    fn differentiate_function(
        &self,
        name: &str,
        param: &Parameter,
    ) -> Result<Expression, EvaluationError> {
        let x = || Expression::Parameter(param.clone());
        let call = |function: &str| Expression::call(function, x());
        let one_minus_x_squared =
            || Expression::Constant(1.0) - x().pow(Expression::Constant(2.0));

        match Builtins::canonical_name(name) {
            "sin" => Ok(call("cos")),
            "cos" => Ok(-call("sin")),
            "tan" => Ok(Expression::Constant(1.0)
                / call("cos").pow(Expression::Constant(2.0))),
            "asin" | "arcsin" => Ok(Expression::Constant(1.0)
                / Expression::call("sqrt", one_minus_x_squared())),
            "acos" | "arccos" => Ok(-(Expression::Constant(1.0)
                / Expression::call("sqrt", one_minus_x_squared()))),
            "atan" | "arctan" => Ok(Expression::Constant(1.0)
                / (Expression::Constant(1.0)
                    + x().pow(Expression::Constant(2.0)))),
            "sinh" => Ok(call("cosh")),
            "cosh" => Ok(call("sinh")),
            "tanh" => Ok(Expression::Constant(1.0)
                - call("tanh").pow(Expression::Constant(2.0))),
            "exp" => Ok(call("exp")),
            "log" | "ln" => Ok(Expression::Constant(1.0) / x()),
            "log10" => Ok(Expression::Constant(1.0)
                / (x() * Expression::Constant(consts::LN_10))),
            "log2" => Ok(Expression::Constant(1.0)
                / (x() * Expression::Constant(consts::LN_2))),
            "sqrt" => Ok(Expression::Constant(0.5) / call("sqrt")),
            "abs" => Ok(x() / call("abs")),
            _ => Err(EvaluationError::UnableToDifferentiate {
                name: name.into(),
            }),
        }
    }

    fn is_known_function(&self, name: &str) -> bool {
        Builtins::arity(Builtins::canonical_name(name)).is_some()
    }

    fn constant(&self, name: &str) -> Option<f64> {
        match Builtins::canonical_name(name) {
            "pi" => Some(consts::PI),
            "e" => Some(consts::E),
            _ => None,
        }
    }
}

/// Evaluate an [`Expression`] to a number.
///
/// Parameters are resolved using `lookup_parameter_value`, falling back to
/// the [`Context`]'s named constants. Producing a non-finite value from
/// finite inputs (e.g. `log(-1)` or `sqrt(-4)`) is a
/// [`EvaluationError::Domain`] error.
pub fn evaluate<F, C>(
    expr: &Expression,
    lookup_parameter_value: &F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
    C: Context,
{
    match expr {
        Expression::Parameter(p) => lookup_parameter_value(p)
            .or_else(|| ctx.constant(p.name()))
            .ok_or_else(|| EvaluationError::UnknownParameter {
                name: p.name().into(),
            }),
        Expression::Constant(value) => Ok(*value),
        Expression::Binary { left, right, op } => {
            let left = evaluate(left, lookup_parameter_value, ctx)?;
            let right = evaluate(right, lookup_parameter_value, ctx)?;

            match op {
                BinaryOperation::Plus => Ok(left + right),
                BinaryOperation::Minus => Ok(left - right),
                BinaryOperation::Times => Ok(left * right),
                BinaryOperation::Divide if right == 0.0 => {
                    Err(EvaluationError::DivisionByZero)
                },
                BinaryOperation::Divide => Ok(left / right),
                BinaryOperation::Power => {
                    check_domain("**", &[left, right], left.powf(right))
                },
            }
        },
        Expression::Negate(inner) => {
            evaluate(inner, lookup_parameter_value, ctx).map(|value| -value)
        },
        Expression::FunctionCall {
            function,
            arguments,
        } => {
            let arguments = arguments
                .iter()
                .map(|arg| evaluate(arg, lookup_parameter_value, ctx))
                .collect::<Result<Vec<_>, _>>()?;

            let value = ctx.evaluate_function(function, &arguments)?;
            check_domain(function, &arguments, value)
        },
    }
}

fn check_domain(
    name: &str,
    arguments: &[f64],
    value: f64,
) -> Result<f64, EvaluationError> {
    if !value.is_finite() && arguments.iter().all(|arg| arg.is_finite()) {
        Err(EvaluationError::Domain { name: name.into() })
    } else {
        Ok(value)
    }
}

/// Replace every named constant the [`Context`] knows about with its value.
pub fn bind_constants<C>(expr: &Expression, ctx: &C) -> Expression
where
    C: Context,
{
    match expr {
        Expression::Parameter(p) => match ctx.constant(p.name()) {
            Some(value) => Expression::Constant(value),
            None => expr.clone(),
        },
        Expression::Constant(_) => expr.clone(),
        Expression::Binary { left, right, op } => Expression::Binary {
            left: Box::new(bind_constants(left, ctx)),
            right: Box::new(bind_constants(right, ctx)),
            op: *op,
        },
        Expression::Negate(inner) => -bind_constants(inner, ctx),
        Expression::FunctionCall {
            function,
            arguments,
        } => Expression::FunctionCall {
            function: function.clone(),
            arguments: arguments
                .iter()
                .map(|arg| bind_constants(arg, ctx))
                .collect(),
        },
    }
}

/// Simplify an expression by evaluating all constant operations.
pub fn fold_constants<C>(expr: &Expression, ctx: &C) -> Expression
where
    C: Context,
{
    match expr {
        Expression::Binary { left, right, op } => {
            fold_binary_op(left, right, *op, ctx)
        },
        Expression::Negate(expr) => match fold_constants(expr, ctx) {
            Expression::Constant(value) => Expression::Constant(-value),
            // double negative
            Expression::Negate(inner) => *inner,
            other => Expression::Negate(Box::new(other)),
        },
        Expression::FunctionCall {
            function,
            arguments,
        } => {
            let arguments: Vec<_> = arguments
                .iter()
                .map(|arg| fold_constants(arg, ctx))
                .collect();

            let constant_arguments: Option<Vec<f64>> = arguments
                .iter()
                .map(|arg| match arg {
                    Expression::Constant(value) => Some(*value),
                    _ => None,
                })
                .collect();

            if let Some(values) = constant_arguments {
                if let Ok(result) = ctx.evaluate_function(function, &values) {
                    if result.is_finite() {
                        return Expression::Constant(result);
                    }
                }
            }

            Expression::FunctionCall {
                function: function.clone(),
                arguments,
            }
        },
        _ => expr.clone(),
    }
}

fn fold_binary_op<C>(
    left: &Expression,
    right: &Expression,
    op: BinaryOperation,
    ctx: &C,
) -> Expression
where
    C: Context,
{
    let left = fold_constants(left, ctx);
    let right = fold_constants(right, ctx);

    // If our operands contain constants, we can use arithmetic's identity laws
    // to simplify things. Operands that might fail to evaluate (division,
    // powers, function calls) are never dropped.
    match (left, right, op) {
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Plus,
        ) if p_left == p_right => {
            Expression::Constant(2.0) * Expression::Parameter(p_right)
        },
        (
            Expression::Parameter(p_left),
            Expression::Parameter(p_right),
            BinaryOperation::Minus,
        ) if p_left == p_right => Expression::Constant(0.0),

        // x + 0 = x
        (Expression::Constant(l), right, BinaryOperation::Plus) if l == 0.0 => {
            right
        },
        (left, Expression::Constant(r), BinaryOperation::Plus) if r == 0.0 => {
            left
        },

        // 0 * x = 0
        (Expression::Constant(l), right, BinaryOperation::Times)
            if l == 0.0 && is_total(&right) =>
        {
            Expression::Constant(0.0)
        },
        (left, Expression::Constant(r), BinaryOperation::Times)
            if r == 0.0 && is_total(&left) =>
        {
            Expression::Constant(0.0)
        },

        // 1 * x = x
        (Expression::Constant(l), right, BinaryOperation::Times)
            if is_one(l) =>
        {
            right
        },
        (left, Expression::Constant(r), BinaryOperation::Times)
            if is_one(r) =>
        {
            left
        },

        // x / 1 = x
        (left, Expression::Constant(r), BinaryOperation::Divide)
            if is_one(r) =>
        {
            left
        },

        // 0 - x = -x
        (Expression::Constant(l), right, BinaryOperation::Minus)
            if l == 0.0 =>
        {
            -right
        },

        // x - 0 = x
        (left, Expression::Constant(r), BinaryOperation::Minus)
            if r == 0.0 =>
        {
            left
        },

        // x**1 = x
        (left, Expression::Constant(r), BinaryOperation::Power)
            if is_one(r) =>
        {
            left
        },

        // x**0 = 1
        (left, Expression::Constant(r), BinaryOperation::Power)
            if r == 0.0 && is_total(&left) =>
        {
            Expression::Constant(1.0)
        },

        // (x * y) * z
        (
            Expression::Constant(constant_a),
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            BinaryOperation::Times,
        ) if left.is_constant() || right.is_constant() => {
            fold_nested_product(constant_a, &left, &right)
        },
        (
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            Expression::Constant(constant_a),
            BinaryOperation::Times,
        ) if left.is_constant() || right.is_constant() => {
            fold_nested_product(constant_a, &left, &right)
        },

        // Evaluate in-place
        (Expression::Constant(l), Expression::Constant(r), op)
            if constant_result(l, r, op).is_some() =>
        {
            Expression::Constant(constant_result(l, r, op).unwrap_or(l))
        },

        // Oh well, we tried
        (left, right, op) => Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        },
    }
}

fn fold_nested_product(
    constant_a: f64,
    left: &Expression,
    right: &Expression,
) -> Expression {
    let (constant_b, expr) = match (left, right) {
        (Expression::Constant(left), right) => (*left, right),
        (left, Expression::Constant(right)) => (*right, left),
        _ => {
            return Expression::Constant(constant_a)
                * (left.clone() * right.clone())
        },
    };

    Expression::Constant(constant_a * constant_b) * expr.clone()
}

/// Is `value` one, to within rounding error?
fn is_one(value: f64) -> bool { value.approx_eq_eps(&1.0, &f64::EPSILON) }

/// Can `expr` be evaluated for any finite parameter values without hitting
/// a division by zero or a domain error?
fn is_total(expr: &Expression) -> bool {
    match expr {
        Expression::Parameter(_) | Expression::Constant(_) => true,
        Expression::Binary { left, right, op } => {
            matches!(
                op,
                BinaryOperation::Plus
                    | BinaryOperation::Minus
                    | BinaryOperation::Times
            ) && is_total(left)
                && is_total(right)
        },
        Expression::Negate(inner) => is_total(inner),
        Expression::FunctionCall { .. } => false,
    }
}

/// The value of `l op r`, when it is a finite number.
fn constant_result(l: f64, r: f64, op: BinaryOperation) -> Option<f64> {
    let value = match op {
        BinaryOperation::Plus => l + r,
        BinaryOperation::Minus => l - r,
        BinaryOperation::Times => l * r,
        BinaryOperation::Divide if r == 0.0 => return None,
        BinaryOperation::Divide => l / r,
        BinaryOperation::Power => l.powf(r),
    };

    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Replace all references to a [`Parameter`] with an [`Expression`].
pub fn substitute(
    expression: &Expression,
    param: &Parameter,
    value: &Expression,
) -> Expression {
    match expression {
        Expression::Parameter(p) => {
            if p == param {
                value.clone()
            } else {
                Expression::Parameter(p.clone())
            }
        },
        Expression::Constant(value) => Expression::Constant(*value),
        Expression::Binary { left, right, op } => {
            let left = substitute(left, param, value);
            let right = substitute(right, param, value);
            Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op: *op,
            }
        },
        Expression::Negate(inner) => -substitute(inner, param, value),
        Expression::FunctionCall {
            function,
            arguments,
        } => Expression::FunctionCall {
            function: function.clone(),
            arguments: arguments
                .iter()
                .map(|arg| substitute(arg, param, value))
                .collect(),
        },
    }
}

/// Calculate an [`Expression`]'s partial derivative with respect to a
/// particular [`Parameter`].
pub fn partial_derivative<C>(
    expr: &Expression,
    param: &Parameter,
    ctx: &C,
) -> Result<Expression, EvaluationError>
where
    C: Context,
{
    let got = match expr {
        Expression::Parameter(p) => {
            if p == param {
                Expression::Constant(1.0)
            } else {
                Expression::Constant(0.0)
            }
        },
        Expression::Constant(_) => Expression::Constant(0.0),
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Plus,
        } => {
            partial_derivative(left, param, ctx)?
                + partial_derivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Minus,
        } => {
            partial_derivative(left, param, ctx)?
                - partial_derivative(right, param, ctx)?
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Times,
        } => {
            // The product rule
            let d_left = partial_derivative(left, param, ctx)?;
            let d_right = partial_derivative(right, param, ctx)?;
            let left = Expression::clone(left);
            let right = Expression::clone(right);

            d_left * right + d_right * left
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } => {
            // The quotient rule
            let d_left = partial_derivative(left, param, ctx)?;
            let d_right = partial_derivative(right, param, ctx)?;
            let right = Expression::clone(right);
            let left = Expression::clone(left);

            (d_left * right.clone() - left * d_right) / (right.clone() * right)
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } => {
            let base = Expression::clone(left);
            let exponent = Expression::clone(right);
            let d_base = partial_derivative(left, param, ctx)?;

            if right.depends_on(param) {
                // d(u**v) = u**v * (v' * ln(u) + v * u' / u)
                let d_exponent = partial_derivative(right, param, ctx)?;
                base.clone().pow(exponent.clone())
                    * (d_exponent * Expression::call("log", base.clone())
                        + exponent * d_base / base)
            } else {
                // The power rule
                exponent.clone()
                    * base.pow(exponent - Expression::Constant(1.0))
                    * d_base
            }
        },

        Expression::Negate(inner) => -partial_derivative(inner, param, ctx)?,
        Expression::FunctionCall {
            function,
            arguments,
        } => match arguments.as_slice() {
            [argument] => {
                // implement the chain rule: (f o g)' = (f' o g) * g'
                let g = Parameter::named("__temp__");
                let f_dash_of_g = ctx.differentiate_function(function, &g)?;
                let g_dash = partial_derivative(argument, param, ctx)?;

                substitute(&f_dash_of_g, &g, argument) * g_dash
            },
            [base, exponent] if is_power_function(function) => {
                let as_power = Expression::clone(base).pow(exponent.clone());
                return partial_derivative(&as_power, param, ctx);
            },
            _ if !expr.depends_on(param) => Expression::Constant(0.0),
            _ => {
                return Err(EvaluationError::UnableToDifferentiate {
                    name: function.clone(),
                })
            },
        },
    };

    Ok(got)
}

pub(crate) fn is_power_function(name: &str) -> bool {
    matches!(Builtins::canonical_name(name), "pow" | "power")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with_x(src: &str, x: f64) -> Result<f64, EvaluationError> {
        let expr: Expression = src.parse().unwrap();
        let x_param = Parameter::named("x");
        let lookup = |p: &Parameter| if *p == x_param { Some(x) } else { None };

        evaluate(&expr, &lookup, &Builtins)
    }

    #[test]
    fn evaluate_simple_expressions() {
        let inputs = vec![
            ("1 + 2*3", 7.0),
            ("x**2", 9.0),
            ("-x**2", -9.0),
            ("(-x)**2", 9.0),
            ("2**3**2", 512.0),
            ("10 - 4 - 3", 3.0),
            ("16/4/2", 2.0),
            ("sqrt(x*3)", 3.0),
            ("abs(-x)", 3.0),
            ("pow(x, 2)", 9.0),
            ("np.sin(0)", 0.0),
            ("exp(0) + log(1)", 1.0),
            ("log2(8)", 3.0),
            ("x^2 + 1", 10.0),
            ("2*pi", 2.0 * consts::PI),
            ("np.pi", consts::PI),
            ("e", consts::E),
        ];

        for (src, should_be) in inputs {
            let got = eval_with_x(src, 3.0).unwrap();
            assert_eq!(got, should_be, "{}", src);
        }
    }

    #[test]
    fn evaluation_errors() {
        let inputs = vec![
            ("log(-1)", EvaluationError::Domain { name: "log".into() }),
            ("sqrt(-4)", EvaluationError::Domain { name: "sqrt".into() }),
            ("log(0)", EvaluationError::Domain { name: "log".into() }),
            ("(-8)**(1/3)", EvaluationError::Domain { name: "**".into() }),
            ("1/(x - 3)", EvaluationError::DivisionByZero),
            ("y + 1", EvaluationError::UnknownParameter { name: "y".into() }),
            (
                "foo(x)",
                EvaluationError::UnknownFunction { name: "foo".into() },
            ),
            (
                "sin(x, x)",
                EvaluationError::WrongArity {
                    name: "sin".into(),
                    expected: 1,
                    found: 2,
                },
            ),
        ];

        for (src, should_be) in inputs {
            let got = eval_with_x(src, 3.0).unwrap_err();
            assert_eq!(got, should_be, "{}", src);
        }
    }

    #[test]
    fn constant_fold_simple_arithmetic() {
        let inputs = vec![
            ("1", 1.0),
            ("1 + 1.5", 1.0 + 1.5),
            ("1 - 1.5", 1.0 - 1.5),
            ("2 * 3", 2.0 * 3.0),
            ("4 / 2", 4.0 / 2.0),
            ("2**10", 1024.0),
            ("sqrt(4)", 4_f64.sqrt()),
            ("sqrt(2 + 2)", (2_f64 + 2.0).sqrt()),
            ("sin(1)", 1_f64.sin()),
            ("sqrt(2 + sqrt(4))", (2.0 + 4_f64.sqrt()).sqrt()),
            ("-(1 + 2)", -(1.0 + 2.0)),
            ("0 * x", 0.0),
            ("x - x", 0.0),
            ("x**0", 1.0),
            ("(2*x + 1) * 0", 0.0),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();
            let got = fold_constants(&expr, &Builtins);

            match got {
                Expression::Constant(value) => assert_eq!(
                    value, should_be,
                    "{} -> {} != {}",
                    expr, value, should_be
                ),
                other => panic!(
                    "Expected a constant expression, but got \"{}\"",
                    other
                ),
            }
        }
    }

    #[test]
    fn constant_folding_leaves_unknowns_unevaluated() {
        let inputs = vec![
            ("x", "x"),
            ("-(2 * 3 + x)", "-(6 + x)"),
            ("unknown_function(3)", "unknown_function(3)"),
            ("log(0)", "log(0)"),
            ("1/0", "1/0"),
            ("2 * x * 3", "6 * x"),
            ("x + 5", "x + 5"),
            ("x + 5*2", "x + 10"),
            ("x + x", "2*x"),
            ("0 + x", "x"),
            ("x + 0", "x"),
            ("1 * x", "x"),
            ("x * 1", "x"),
            ("x - 0", "x"),
            ("0 - x", "-x"),
            ("x / 1", "x"),
            ("x**1", "x"),
            ("--x", "x"),
            ("(x + x)*3 + 5", "6*x + 5"),
            ("1e-7*x", "1e-7*x"),
            ("x + 1e-7", "x + 1e-7"),
            ("x - 1e-7", "x - 1e-7"),
            ("1.0000001*x", "1.0000001*x"),
            ("x**1.0000001", "x**1.0000001"),
            ("x/x", "x/x"),
            ("0/x", "0/x"),
            ("log(x)*0", "log(x)*0"),
            ("0*sqrt(x)", "0*sqrt(x)"),
            ("(1/x)*0", "(1/x)*0"),
            ("log(x)**0", "log(x)**0"),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();

            let got = fold_constants(&expr, &Builtins);

            let should_be: Expression = should_be.parse().unwrap();

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn bind_known_constants() {
        let expr: Expression = "2*pi*x + np.e".parse().unwrap();

        let got = bind_constants(&expr, &Builtins);

        let should_be = Expression::Constant(2.0)
            * Expression::Constant(consts::PI)
            * Expression::Parameter(Parameter::named("x"))
            + Expression::Constant(consts::E);
        assert_eq!(got, should_be);
    }

    #[test]
    fn basic_substitutions() {
        let parameter = Parameter::named("x");
        let inputs = vec![
            ("1 + 2", "3", "1 + 2"),
            ("x", "5", "5"),
            ("y", "5", "y"),
            ("x + 5", "5", " 5 + 5"),
            ("-x", "5", "-5"),
            ("sin(x)", "y + y", "sin(y + y)"),
            ("pow(x, x)", "2", "pow(2, 2)"),
        ];

        for (src, new_value, should_be) in inputs {
            let original: Expression = src.parse().unwrap();
            let new_value: Expression = new_value.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = substitute(&original, &parameter, &new_value);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn differentiate_wrt_x() {
        let x = Parameter::named("x");
        let inputs = vec![
            ("x", "1"),
            ("1", "0"),
            ("x*x", "2 * x"),
            ("x - y", "1"),
            ("sin(x)", "cos(x)"),
            ("cos(x)", "-sin(x)"),
            ("exp(x)", "exp(x)"),
            ("sqrt(x)", "0.5 / sqrt(x)"),
            ("x**3", "3*x**2"),
        ];

        for (src, should_be) in inputs {
            let original: Expression = src.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = partial_derivative(&original, &x, &Builtins).unwrap();
            let got = fold_constants(&got, &Builtins);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn derivatives_agree_with_finite_differences() {
        let x = Parameter::named("x");
        let inputs = vec![
            "3*x*x + 5*x + 2",
            "x/(1 + x)",
            "2**x",
            "pow(x, 3)",
            "log(x)*tan(x)",
            "x**x",
        ];
        let at = 0.7;
        let h = 1e-6;

        for src in inputs {
            let original: Expression = src.parse().unwrap();
            let derivative =
                partial_derivative(&original, &x, &Builtins).unwrap();

            let symbolic = eval_with_x(&derivative.to_string(), at).unwrap();
            let numeric = (eval_with_x(src, at + h).unwrap()
                - eval_with_x(src, at - h).unwrap())
                / (2.0 * h);

            assert!(
                approx::relative_eq!(
                    symbolic,
                    numeric,
                    max_relative = 1e-5
                ),
                "d/dx {} = {} but expected {}",
                src,
                symbolic,
                numeric
            );
        }
    }
}
