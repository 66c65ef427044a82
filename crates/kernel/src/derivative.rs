use std::f64::consts::{LN_10, LN_2};

use crate::error::{EvalError, EvalResult};
use crate::expr::{BinaryOp, Expr, Operation, UnaryOp};

/// Symbolic derivative with respect to `x`.
///
/// Constant exponents keep their fraction shape (`x^(p/q)` differentiates
/// to `(p/q) * x^((p - q)/q)`), so the result still resolves negative bases
/// the way the undifferentiated power does.
pub fn derivative(expr: &Expr) -> EvalResult<Expr> {
    match expr {
        Expr::Const(_) => Ok(Expr::c(0.0)),
        Expr::X => Ok(Expr::c(1.0)),
        Expr::Vector(items) => items
            .iter()
            .map(derivative)
            .collect::<EvalResult<Vec<_>>>()
            .map(Expr::Vector),
        Expr::Unary(op, u) => {
            let du = derivative(u)?;
            Ok(mul(unary_outer(*op, u)?, du))
        }
        Expr::Binary(op, a, b) => binary(*op, a, b),
        Expr::Derivative(inner) => derivative(&derivative(inner)?),
        Expr::If {
            condition,
            then,
            otherwise,
        } => Ok(Expr::If {
            condition: condition.clone(),
            then: Box::new(derivative(then)?),
            otherwise: match otherwise {
                Some(e) => Some(Box::new(derivative(e)?)),
                None => None,
            },
        }),
    }
}

/// `f'(u)` for `f(u)`; the caller multiplies by `u'`.
fn unary_outer(op: UnaryOp, u: &Expr) -> EvalResult<Expr> {
    let u = u.clone();
    let outer = match op {
        UnaryOp::Sqrt => Expr::c(1.0).div(Expr::c(2.0).mul(u.sqrt())),
        UnaryOp::Exp => u.exp(),
        UnaryOp::Ln => Expr::c(1.0).div(u),
        UnaryOp::Log10 => Expr::c(1.0).div(u.mul(Expr::c(LN_10))),
        UnaryOp::Log2 => Expr::c(1.0).div(u.mul(Expr::c(LN_2))),
        UnaryOp::Abs => u.clone().div(u.abs()),
        UnaryOp::Sin => u.cos(),
        UnaryOp::Cos => u.sin().neg(),
        UnaryOp::Tan => Expr::unary(UnaryOp::Sec, u).pow(Expr::c(2.0)),
        UnaryOp::Sec => Expr::unary(UnaryOp::Sec, u.clone()).mul(Expr::unary(UnaryOp::Tan, u)),
        UnaryOp::Csc => Expr::unary(UnaryOp::Csc, u.clone())
            .mul(Expr::unary(UnaryOp::Cot, u))
            .neg(),
        UnaryOp::Cot => Expr::unary(UnaryOp::Csc, u).pow(Expr::c(2.0)).neg(),
        UnaryOp::Asin => Expr::c(1.0).div(Expr::c(1.0).sub(u.pow(Expr::c(2.0))).sqrt()),
        UnaryOp::Acos => Expr::c(-1.0).div(Expr::c(1.0).sub(u.pow(Expr::c(2.0))).sqrt()),
        UnaryOp::Atan => Expr::c(1.0).div(Expr::c(1.0).add(u.pow(Expr::c(2.0)))),
        UnaryOp::Sinh => Expr::unary(UnaryOp::Cosh, u),
        UnaryOp::Cosh => Expr::unary(UnaryOp::Sinh, u),
        UnaryOp::Tanh => Expr::c(1.0).sub(Expr::unary(UnaryOp::Tanh, u).pow(Expr::c(2.0))),
        UnaryOp::Floor | UnaryOp::Ceil | UnaryOp::Round | UnaryOp::Sgn => {
            return Err(EvalError::NotDifferentiable(Operation::Unary(op)))
        }
    };
    Ok(outer)
}

fn binary(op: BinaryOp, a: &Expr, b: &Expr) -> EvalResult<Expr> {
    match op {
        BinaryOp::Plus => Ok(add(derivative(a)?, derivative(b)?)),
        BinaryOp::Minus => Ok(sub(derivative(a)?, derivative(b)?)),
        BinaryOp::Multiply => {
            let da = derivative(a)?;
            let db = derivative(b)?;
            Ok(add(mul(da, b.clone()), mul(a.clone(), db)))
        }
        BinaryOp::Divide => {
            let da = derivative(a)?;
            let db = derivative(b)?;
            let numerator = sub(mul(da, b.clone()), mul(a.clone(), db));
            Ok(numerator.div(b.clone().pow(Expr::c(2.0))))
        }
        BinaryOp::Power => power(a, b),
        BinaryOp::NRoot => power(a, &Expr::c(1.0).div(b.clone())),
        BinaryOp::Min | BinaryOp::Max => Err(EvalError::NotDifferentiable(Operation::Binary(op))),
    }
}

fn power(base: &Expr, exponent: &Expr) -> EvalResult<Expr> {
    let da = derivative(base)?;
    if !exponent.contains_variable() {
        // c * a^(c - 1) * a'
        let lowered = match exponent {
            Expr::Binary(BinaryOp::Divide, p, q) => {
                Expr::binary(BinaryOp::Minus, (**p).clone(), (**q).clone()).div((**q).clone())
            }
            Expr::Const(c) => Expr::c(c - 1.0),
            other => other.clone().sub(Expr::c(1.0)),
        };
        return Ok(mul(mul(exponent.clone(), base.clone().pow(lowered)), da));
    }
    let db = derivative(exponent)?;
    let whole = base.clone().pow(exponent.clone());
    if !base.contains_variable() {
        return Ok(mul(mul(whole, base.clone().ln()), db));
    }
    // a^b * (b' ln a + b a' / a)
    let inner = add(
        mul(db, base.clone().ln()),
        mul(exponent.clone(), da).div(base.clone()),
    );
    Ok(mul(whole, inner))
}

fn is_const(e: &Expr, v: f64) -> bool {
    matches!(e, Expr::Const(c) if *c == v)
}

fn add(a: Expr, b: Expr) -> Expr {
    if is_const(&a, 0.0) {
        b
    } else if is_const(&b, 0.0) {
        a
    } else {
        a.add(b)
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    if is_const(&b, 0.0) {
        a
    } else if is_const(&a, 0.0) {
        b.neg()
    } else {
        a.sub(b)
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    if is_const(&a, 0.0) || is_const(&b, 0.0) {
        Expr::c(0.0)
    } else if is_const(&a, 1.0) {
        b
    } else if is_const(&b, 1.0) {
        a
    } else {
        a.mul(b)
    }
}
