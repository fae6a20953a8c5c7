//! Univariate polynomials with real coefficients, and their roots.

use crate::{
    algebra::{
        ops::{is_power_function, Context},
        BinaryOperation, Expression, Parameter,
    },
    Number,
};
use nalgebra::{Complex, DMatrix as Matrix, Normed};

/// A polynomial, `c[0] + c[1]*x + c[2]*x**2 + ...`.
///
/// The highest coefficient is never zero, so the zero polynomial has no
/// coefficients at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        let mut poly = Polynomial { coefficients };
        poly.normalize();
        poly
    }

    pub fn constant(value: f64) -> Self {
        Polynomial::from_coefficients(vec![value])
    }

    /// The polynomial `x`.
    pub fn identity() -> Self {
        Polynomial::from_coefficients(vec![0.0, 1.0])
    }

    pub fn coefficients(&self) -> &[f64] { &self.coefficients }

    pub fn degree(&self) -> usize { self.coefficients.len().saturating_sub(1) }

    /// The polynomial's value, if it doesn't depend on `x`.
    pub fn as_constant(&self) -> Option<f64> {
        match self.coefficients.as_slice() {
            [] => Some(0.0),
            [c] => Some(*c),
            _ => None,
        }
    }

    /// Try to interpret an [`Expression`] as a polynomial in `param`.
    ///
    /// Only sums, differences, products, division by constants and
    /// non-negative integer powers are accepted. Anything else (including
    /// other parameters, or a result above `max_degree`) gives `None`.
    pub fn from_expression<C>(
        expr: &Expression,
        param: &Parameter,
        ctx: &C,
        max_degree: usize,
    ) -> Option<Polynomial>
    where
        C: Context,
    {
        let poly = match expr {
            Expression::Constant(value) => Polynomial::constant(*value),
            Expression::Parameter(p) if p == param => Polynomial::identity(),
            Expression::Parameter(_) => return None,
            Expression::Negate(inner) => {
                Polynomial::from_expression(inner, param, ctx, max_degree)?
                    .scale(-1.0)
            },
            Expression::Binary { left, right, op } => {
                let left =
                    Polynomial::from_expression(left, param, ctx, max_degree)?;
                let right =
                    Polynomial::from_expression(right, param, ctx, max_degree)?;

                match op {
                    BinaryOperation::Plus => left.add(&right),
                    BinaryOperation::Minus => left.add(&right.scale(-1.0)),
                    BinaryOperation::Times => left.mul(&right),
                    BinaryOperation::Divide => {
                        let divisor = right.as_constant()?;
                        if divisor == 0.0 {
                            return None;
                        }
                        left.scale(1.0 / divisor)
                    },
                    BinaryOperation::Power => {
                        left.pow(right.as_constant()?, max_degree)?
                    },
                }
            },
            Expression::FunctionCall {
                function,
                arguments,
            } => {
                let arguments = arguments
                    .iter()
                    .map(|arg| {
                        Polynomial::from_expression(arg, param, ctx, max_degree)
                    })
                    .collect::<Option<Vec<_>>>()?;

                match arguments.as_slice() {
                    [base, exponent] if is_power_function(function) => {
                        base.pow(exponent.as_constant()?, max_degree)?
                    },
                    _ => {
                        let values = arguments
                            .iter()
                            .map(Polynomial::as_constant)
                            .collect::<Option<Vec<_>>>()?;
                        let value =
                            ctx.evaluate_function(function, &values).ok()?;

                        if !value.is_finite() {
                            return None;
                        }
                        Polynomial::constant(value)
                    },
                }
            },
        };

        if poly.degree() <= max_degree {
            Some(poly)
        } else {
            None
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Evaluate the polynomial and its derivative at `z` using Horner's
    /// method.
    fn evaluate_with_derivative(
        &self,
        z: Complex<f64>,
    ) -> (Complex<f64>, Complex<f64>) {
        let zero = Complex::new(0.0, 0.0);

        self.coefficients
            .iter()
            .rev()
            .fold((zero, zero), |(value, derivative), &c| {
                (value * z + c, derivative * z + value)
            })
    }

    /// Find every distinct root over the complex numbers.
    ///
    /// Real roots come first in ascending order, followed by complex roots.
    /// The constant polynomial has no roots. Returns `None` if the
    /// eigenvalue iteration fails to converge.
    pub fn roots(&self) -> Option<Vec<Number>> {
        let mut roots = Vec::new();

        // x = 0 is a root whenever the constant term vanishes, and
        // dividing it out keeps the remaining roots exact
        let zeros = self.coefficients.iter().take_while(|&&c| c == 0.0).count();
        if zeros > 0 && self.degree() > 0 {
            roots.push(Number::Real(0.0));
        }
        let reduced = Polynomial::from_coefficients(
            self.coefficients[zeros.min(self.coefficients.len())..].to_vec(),
        );

        // solve for y = x / scale, which puts the roots near the unit circle
        let scale = reduced.root_scale();
        let (scale, scaled) = match reduced.rescale(scale) {
            Some(scaled) => (scale, scaled),
            None => (1.0, reduced),
        };

        // a repeated root would otherwise come back as a cluster of nearby
        // roots, so solve the square-free part instead
        let scaled = scaled.square_free();

        let scaled_roots = match *scaled.coefficients.as_slice() {
            [] | [_] => Vec::new(),
            [c, b] => vec![Number::Real(-c / b)],
            [c, b, a] => quadratic_roots(a, b, c),
            _ => scaled.companion_roots()?,
        };

        roots.extend(scaled_roots.into_iter().map(|root| {
            Number::from_complex(root.to_complex() * scale)
        }));

        roots.sort_by(Number::solution_order);
        roots.dedup_by(|a, b| a.is_close_to(b, DUPLICATE_ROOT_TOLERANCE));

        Some(roots)
    }

    /// Use the eigenvalues of the polynomial's companion matrix as initial
    /// estimates, then polish them with a couple of Newton steps.
    ///
    /// Complex roots of a real polynomial come in conjugate pairs, so only
    /// the upper half-plane root of each pair is kept and mirrored.
    fn companion_roots(&self) -> Option<Vec<Number>> {
        let n = self.degree();
        let leading = self.coefficients[n];
        let mut companion = Matrix::<f64>::zeros(n, n);

        for i in 1..n {
            companion[(i, i - 1)] = 1.0;
        }
        for (i, c) in self.coefficients[..n].iter().enumerate() {
            companion[(i, n - 1)] = -c / leading;
        }

        let schur = companion.try_schur(f64::EPSILON, MAX_SCHUR_ITERATIONS)?;
        let eigenvalues = schur.complex_eigenvalues();

        let mut roots = Vec::with_capacity(n);

        for &z in eigenvalues.iter() {
            match Number::from_complex(self.polish(z)) {
                Number::Complex(z) if z.im < 0.0 => {},
                Number::Complex(z) => {
                    roots.push(Number::Complex(z.conj()));
                    roots.push(Number::Complex(z));
                },
                real => roots.push(real),
            }
        }

        Some(roots)
    }

    fn polish(&self, mut z: Complex<f64>) -> Complex<f64> {
        for _ in 0..MAX_POLISHING_STEPS {
            let (value, derivative) = self.evaluate_with_derivative(z);
            if derivative.norm() == 0.0 {
                break;
            }

            let step = value / derivative;
            if !step.re.is_finite() || !step.im.is_finite() {
                break;
            }

            z -= step;
            if step.norm() <= f64::EPSILON * z.norm() {
                break;
            }
        }

        z
    }

    /// A power of two close to the geometric mean of the roots' magnitudes.
    fn root_scale(&self) -> f64 {
        let n = self.degree();
        let (first, last) =
            match (self.coefficients.first(), self.coefficients.last()) {
                (Some(&first), Some(&last)) if n > 0 && first != 0.0 => {
                    (first, last)
                },
                _ => return 1.0,
            };

        let exponent = ((first / last).abs().log2() / n as f64).round();
        if exponent.is_finite() {
            2_f64.powi(exponent.clamp(-512.0, 512.0) as i32)
        } else {
            1.0
        }
    }

    /// `p(factor * y)` as a polynomial in `y`, if every coefficient is still
    /// representable.
    fn rescale(&self, factor: f64) -> Option<Polynomial> {
        let mut power = 1.0;
        let mut coefficients = Vec::with_capacity(self.coefficients.len());

        for &c in &self.coefficients {
            let scaled = c * power;
            if !scaled.is_finite() || (scaled == 0.0 && c != 0.0) {
                return None;
            }

            coefficients.push(scaled);
            power *= factor;
        }

        Some(Polynomial::from_coefficients(coefficients))
    }

    /// The polynomial with the same roots, but each of them only once.
    ///
    /// Every repeated root of `p` is also a root of `p'`, so dividing by
    /// `gcd(p, p')` leaves each root with a multiplicity of one.
    pub fn square_free(&self) -> Polynomial {
        if self.degree() < 2 {
            return self.clone();
        }

        let common = self.gcd(&self.derivative());
        if common.degree() == 0 {
            return self.clone();
        }

        // a spurious common factor from rounding won't divide p exactly
        let (quotient, remainder) = self.div_rem(&common);
        if remainder.largest_coefficient()
            > GCD_TOLERANCE * self.largest_coefficient()
        {
            return self.clone();
        }

        quotient
    }

    pub fn derivative(&self) -> Polynomial {
        Polynomial::from_coefficients(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    /// Long division, giving the quotient and remainder.
    pub fn div_rem(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        let d = divisor.degree();
        let leading = match divisor.coefficients.last() {
            Some(&c) => c,
            None => return (Polynomial::constant(0.0), self.clone()),
        };

        if self.coefficients.len() <= d {
            return (Polynomial::constant(0.0), self.clone());
        }

        let mut remainder = self.coefficients.clone();
        let mut quotient = vec![0.0; remainder.len() - d];

        for i in (0..quotient.len()).rev() {
            let factor = remainder[i + d] / leading;
            quotient[i] = factor;

            for (j, c) in divisor.coefficients.iter().enumerate() {
                remainder[i + j] -= factor * c;
            }
            remainder[i + d] = 0.0;
        }

        remainder.truncate(d);

        (
            Polynomial::from_coefficients(quotient),
            Polynomial::from_coefficients(remainder),
        )
    }

    /// The monic greatest common divisor, found with Euclid's algorithm.
    ///
    /// Remainder coefficients which are rounding error relative to the
    /// dividend are treated as zero.
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        let mut a = self.monic();
        let mut b = other.monic();

        while !b.coefficients.is_empty() {
            let (_, remainder) = a.div_rem(&b);
            let cutoff = GCD_TOLERANCE * a.largest_coefficient();
            let remainder = Polynomial::from_coefficients(
                remainder
                    .coefficients
                    .iter()
                    .map(|&c| if c.abs() <= cutoff { 0.0 } else { c })
                    .collect(),
            );

            a = b;
            b = remainder.monic();
        }

        a
    }

    fn monic(&self) -> Polynomial {
        match self.coefficients.last() {
            Some(&leading) => self.scale(1.0 / leading),
            None => self.clone(),
        }
    }

    fn largest_coefficient(&self) -> f64 {
        self.coefficients
            .iter()
            .fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }

    fn normalize(&mut self) {
        while self.coefficients.last() == Some(&0.0) {
            self.coefficients.pop();
        }
    }

    fn scale(&self, factor: f64) -> Polynomial {
        Polynomial::from_coefficients(
            self.coefficients.iter().map(|c| c * factor).collect(),
        )
    }

    fn add(&self, other: &Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(other.coefficients.len());
        let coefficient = |poly: &Polynomial, i: usize| {
            poly.coefficients.get(i).copied().unwrap_or(0.0)
        };

        Polynomial::from_coefficients(
            (0..len)
                .map(|i| {
                    let (a, b) = (coefficient(self, i), coefficient(other, i));
                    let sum = a + b;
                    let largest = a.abs().max(b.abs());

                    // terms which cancel are zero, not rounding error
                    if sum.abs() <= CANCELLATION_TOLERANCE * largest {
                        0.0
                    } else {
                        sum
                    }
                })
                .collect(),
        )
    }

    fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.coefficients.is_empty() || other.coefficients.is_empty() {
            return Polynomial::from_coefficients(Vec::new());
        }

        let mut product =
            vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];

        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
            }
        }

        Polynomial::from_coefficients(product)
    }

    /// Raise the polynomial to a non-negative integer power.
    fn pow(&self, exponent: f64, max_degree: usize) -> Option<Polynomial> {
        if let Some(base) = self.as_constant() {
            let value = base.powf(exponent);
            return if value.is_finite() {
                Some(Polynomial::constant(value))
            } else {
                None
            };
        }

        if exponent < 0.0
            || exponent.fract() != 0.0
            || exponent > max_degree as f64
            || self.degree() * exponent as usize > max_degree
        {
            return None;
        }

        let mut result = Polynomial::constant(1.0);
        for _ in 0..exponent as usize {
            result = result.mul(self);
        }

        Some(result)
    }
}

const DUPLICATE_ROOT_TOLERANCE: f64 = 1e-6;
const CANCELLATION_TOLERANCE: f64 = 4.0 * f64::EPSILON;
const GCD_TOLERANCE: f64 = 1e-10;
const MAX_SCHUR_ITERATIONS: usize = 10_000;
const MAX_POLISHING_STEPS: usize = 16;

/// The roots of `a*x**2 + b*x + c`, where `a` is non-zero.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<Number> {
    let discriminant = b * b - 4.0 * a * c;

    if discriminant > 0.0 {
        // avoid catastrophic cancellation by never subtracting similar
        // magnitudes
        let sign = if b >= 0.0 { 1.0 } else { -1.0 };
        let q = -0.5 * (b + sign * discriminant.sqrt());

        vec![Number::from(q / a + 0.0), Number::from(c / q + 0.0)]
    } else if discriminant == 0.0 {
        vec![Number::from_complex(Complex::new(-b / (2.0 * a), 0.0))]
    } else {
        let re = -b / (2.0 * a);
        let im = (-discriminant).sqrt() / (2.0 * a).abs();

        vec![
            Number::Complex(Complex::new(re + 0.0, -im)),
            Number::Complex(Complex::new(re + 0.0, im)),
        ]
    }
}
