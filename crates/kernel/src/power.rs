use tracing::warn;

use crate::error::{EvalError, EvalResult};
use crate::expr::{BinaryOp, Expr, Operation};
use crate::function::evaluate;
use crate::interval::{exact_integer, Interval};

/// Syntactic shape of an exponent.
///
/// `1/3` written as a fraction and `0.333...` evaluate to the same number,
/// but only the fraction names the real cube root of a negative base, so the
/// shape is read from the tree rather than from the value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExponentShape<'a> {
    ExactFraction { numerator: &'a Expr, denominator: &'a Expr },
    NegatedExactFraction { numerator: &'a Expr, denominator: &'a Expr },
    Other,
}

impl<'a> ExponentShape<'a> {
    pub fn classify(exponent: &'a Expr) -> Self {
        match (exponent.operation(), exponent.left(), exponent.right()) {
            (Operation::Binary(BinaryOp::Divide), Some(p), Some(q)) => ExponentShape::ExactFraction {
                numerator: p,
                denominator: q,
            },
            (Operation::Binary(BinaryOp::Multiply), Some(minus_one), Some(fraction))
                if minus_one.is_minus_one() =>
            {
                match Self::classify(fraction) {
                    ExponentShape::ExactFraction {
                        numerator,
                        denominator,
                    } => ExponentShape::NegatedExactFraction {
                        numerator,
                        denominator,
                    },
                    _ => ExponentShape::Other,
                }
            }
            _ => ExponentShape::Other,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PowerEvaluator<'a> {
    base: &'a Expr,
    exponent: &'a Expr,
}

impl<'a> PowerEvaluator<'a> {
    pub fn new(base: &'a Expr, exponent: &'a Expr) -> Self {
        Self { base, exponent }
    }

    pub fn for_node(node: &'a Expr) -> Option<Self> {
        match node {
            Expr::Binary(BinaryOp::Power, base, exponent) => Some(Self::new(base, exponent)),
            _ => None,
        }
    }

    pub fn evaluate(&self, x: Interval) -> EvalResult<Interval> {
        let base = evaluate(x, self.base)?;
        let exponent = evaluate(x, self.exponent)?;
        Ok(self.resolve(base, exponent))
    }

    fn resolve(&self, base: Interval, exponent: Interval) -> Interval {
        if base.is_exactly_e() {
            return exponent.exp();
        }
        if base.is_negative() && self.exponent.is_compound() {
            match self.rational_power(base) {
                Ok(Some(power)) if !power.is_undefined() => return power,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, exponent = %self.exponent, "exact fraction power failed, using real power");
                }
            }
        }
        base.pow(exponent)
    }

    /// `base^(p/q)` for an exponent written as an exact fraction; `None`
    /// when the shape or its parts do not name one.
    fn rational_power(&self, base: Interval) -> EvalResult<Option<Interval>> {
        match ExponentShape::classify(self.exponent) {
            ExponentShape::ExactFraction {
                numerator,
                denominator,
            } => fraction_power(base, numerator, denominator),
            ExponentShape::NegatedExactFraction {
                numerator,
                denominator,
            } => Ok(fraction_power(base, numerator, denominator)?
                .map(Interval::multiplicative_inverse)),
            ExponentShape::Other => Ok(None),
        }
    }
}

fn fraction_power(base: Interval, numerator: &Expr, denominator: &Expr) -> EvalResult<Option<Interval>> {
    let a = evaluate(base, numerator)?;
    if !a.is_singleton_integer() {
        return Ok(None);
    }
    let b = evaluate(base, denominator)?;
    if !b.is_singleton_integer() {
        return Ok(None);
    }
    Ok(power_fraction(base, to_integer(a)?, to_integer(b)?))
}

fn to_integer(v: Interval) -> EvalResult<i64> {
    exact_integer(v.low()).ok_or(EvalError::IntegerOverflow(v.low()))
}

/// `base^(a/b)` with the fraction reduced to lowest terms first. `None` when
/// the denominator is zero or no real root exists.
pub fn power_fraction(base: Interval, a: i64, b: i64) -> Option<Interval> {
    let divisor = i64::try_from(gcd(a.unsigned_abs(), b.unsigned_abs())).ok()?;
    if divisor == 0 {
        return None;
    }
    let (mut n, mut d) = (a / divisor, b / divisor);
    if d == 0 {
        return None;
    }
    if d < 0 {
        n = n.checked_neg()?;
        d = d.checked_neg()?;
    }

    let raised = if n == 1 { base } else { base.powi(n) };
    let root = 1.0 / d as f64;
    if raised.is_positive() {
        Some(raised.powf(root))
    } else if d % 2 == 0 {
        None
    } else if raised.is_negative() {
        Some(raised.negative().powf(root).negative())
    } else {
        Some(raised.nth_root(d))
    }
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
