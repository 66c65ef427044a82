use tracing::trace;

use crate::derivative::derivative;
use crate::error::{EvalError, EvalResult};
use crate::expr::{BinaryOp, Comparison, Condition, Expr, Operation, UnaryOp};
use crate::interval::Interval;
use crate::power::PowerEvaluator;
use crate::support::first_unsupported;

/// Interval implementation of a unary operator, `None` when the operator
/// has none. The support filter reads the same table, so an operator is
/// supported exactly when it can be dispatched here.
pub fn unary_interval_fn(op: UnaryOp) -> Option<fn(Interval) -> Interval> {
    let f: fn(Interval) -> Interval = match op {
        UnaryOp::Sqrt => Interval::sqrt,
        UnaryOp::Exp => Interval::exp,
        UnaryOp::Ln => Interval::ln,
        UnaryOp::Log10 => Interval::log10,
        UnaryOp::Log2 => Interval::log2,
        UnaryOp::Abs => Interval::abs,
        UnaryOp::Sin => Interval::sin,
        UnaryOp::Cos => Interval::cos,
        UnaryOp::Tan => Interval::tan,
        UnaryOp::Sec => Interval::sec,
        UnaryOp::Csc => Interval::csc,
        UnaryOp::Cot => Interval::cot,
        UnaryOp::Asin => Interval::asin,
        UnaryOp::Acos => Interval::acos,
        UnaryOp::Atan => Interval::atan,
        UnaryOp::Sinh => Interval::sinh,
        UnaryOp::Cosh => Interval::cosh,
        UnaryOp::Tanh => Interval::tanh,
        UnaryOp::Floor | UnaryOp::Ceil | UnaryOp::Round | UnaryOp::Sgn => return None,
    };
    Some(f)
}

/// Binary counterpart of [`unary_interval_fn`]. `Power` maps to the plain
/// real power; power nodes are routed through [`PowerEvaluator`] first,
/// which falls back to it.
pub fn binary_interval_fn(op: BinaryOp) -> Option<fn(Interval, Interval) -> Interval> {
    let f: fn(Interval, Interval) -> Interval = match op {
        BinaryOp::Plus => |a: Interval, b: Interval| a + b,
        BinaryOp::Minus => |a: Interval, b: Interval| a - b,
        BinaryOp::Multiply => |a: Interval, b: Interval| a * b,
        BinaryOp::Divide => |a: Interval, b: Interval| a / b,
        BinaryOp::Power => Interval::pow,
        BinaryOp::NRoot => Interval::nroot,
        BinaryOp::Min | BinaryOp::Max => return None,
    };
    Some(f)
}

/// A function of `x` that passed the support filter and can be evaluated
/// on intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalFunction {
    expr: Expr,
}

impl IntervalFunction {
    pub fn new(expr: Expr) -> EvalResult<Self> {
        match first_unsupported(&expr) {
            Some(op) => Err(EvalError::Unsupported(op)),
            None => Ok(Self { expr }),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, x: Interval) -> EvalResult<Interval> {
        evaluate(x, &self.expr)
    }
}

/// Enclosure of `expr` over every point of `x`.
pub fn evaluate(x: Interval, expr: &Expr) -> EvalResult<Interval> {
    match expr {
        Expr::Const(c) => Ok(Interval::singleton(*c)),
        Expr::X => Ok(x),
        Expr::Vector(_) => Err(EvalError::VectorValued),
        Expr::Unary(op, a) => {
            let f = unary_interval_fn(*op).ok_or(EvalError::Unsupported(Operation::Unary(*op)))?;
            Ok(f(evaluate(x, a)?))
        }
        Expr::Binary(BinaryOp::Power, base, exponent) => {
            PowerEvaluator::new(base, exponent).evaluate(x)
        }
        Expr::Binary(BinaryOp::Multiply, a, b) if a.is_vector() && b.is_vector() => {
            dot(x, a, b)
        }
        Expr::Binary(op, a, b) => {
            let f = binary_interval_fn(*op).ok_or(EvalError::Unsupported(Operation::Binary(*op)))?;
            Ok(f(evaluate(x, a)?, evaluate(x, b)?))
        }
        Expr::Derivative(inner) => {
            let d = derivative(inner)?;
            trace!(%inner, derivative = %d, "differentiated");
            evaluate(x, &d)
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => match truth(x, condition)? {
            Truth::Undefined => Ok(Interval::UNDEFINED),
            Truth::True => evaluate(x, then),
            Truth::False => match otherwise {
                Some(e) => evaluate(x, e),
                None => Ok(Interval::UNDEFINED),
            },
            Truth::Mixed => {
                let then = evaluate(x, then)?;
                match otherwise {
                    Some(e) => Ok(then.hull(evaluate(x, e)?)),
                    None => Ok(then),
                }
            }
        },
    }
}

fn dot(x: Interval, a: &Expr, b: &Expr) -> EvalResult<Interval> {
    let a = components(x, a)?;
    let b = components(x, b)?;
    if a.len() != b.len() {
        return Err(EvalError::DimensionMismatch(a.len(), b.len()));
    }
    Ok(a
        .into_iter()
        .zip(b)
        .fold(Interval::zero(), |sum, (p, q)| sum + p * q))
}

fn components(x: Interval, expr: &Expr) -> EvalResult<Vec<Interval>> {
    match expr {
        Expr::Vector(items) => items.iter().map(|e| evaluate(x, e)).collect(),
        Expr::Binary(op @ (BinaryOp::Plus | BinaryOp::Minus), a, b) => {
            let a = components(x, a)?;
            let b = components(x, b)?;
            if a.len() != b.len() {
                return Err(EvalError::DimensionMismatch(a.len(), b.len()));
            }
            Ok(a.into_iter()
                .zip(b)
                .map(|(p, q)| if *op == BinaryOp::Plus { p + q } else { p - q })
                .collect())
        }
        Expr::Binary(BinaryOp::Multiply, a, b) if a.is_vector() != b.is_vector() => {
            let (scalar, vector) = if a.is_vector() { (b, a) } else { (a, b) };
            let s = evaluate(x, scalar)?;
            Ok(components(x, vector)?.into_iter().map(|v| v * s).collect())
        }
        Expr::Binary(BinaryOp::Divide, a, b) if a.is_vector() => {
            let s = evaluate(x, b)?;
            Ok(components(x, a)?.into_iter().map(|v| v / s).collect())
        }
        _ => Err(EvalError::VectorValued),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Truth {
    True,
    False,
    Mixed,
    Undefined,
}

/// Whether the condition holds on all, none or some of `x`.
fn truth(x: Interval, condition: &Condition) -> EvalResult<Truth> {
    let l = evaluate(x, &condition.lhs)?;
    let r = evaluate(x, &condition.rhs)?;
    if l.is_undefined() || r.is_undefined() {
        return Ok(Truth::Undefined);
    }
    let (always, never) = match condition.cmp {
        Comparison::Less => (l.high() < r.low(), l.low() >= r.high()),
        Comparison::LessEq => (l.high() <= r.low(), l.low() > r.high()),
        Comparison::Greater => (l.low() > r.high(), l.high() <= r.low()),
        Comparison::GreaterEq => (l.low() >= r.high(), l.high() < r.low()),
    };
    Ok(if always {
        Truth::True
    } else if never {
        Truth::False
    } else {
        Truth::Mixed
    })
}
