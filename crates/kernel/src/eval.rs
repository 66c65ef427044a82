use crate::derivative::derivative;
use crate::expr::{BinaryOp, Expr, UnaryOp};

/// Point evaluation at `x`. Used for constant exponents and as the
/// non-rigorous fallback for trees interval evaluation rejects; anything
/// without a real value comes out as NaN.
pub fn eval(expr: &Expr, x: f64) -> f64 {
    match expr {
        Expr::Const(c) => *c,
        Expr::X => x,
        Expr::Vector(_) => f64::NAN,
        Expr::Unary(op, a) => unary_point_fn(*op)(eval(a, x)),
        Expr::Binary(op, a, b) => binary_point_fn(*op)(eval(a, x), eval(b, x)),
        Expr::Derivative(a) => derivative(a).map_or(f64::NAN, |d| eval(&d, x)),
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            let lhs = eval(&condition.lhs, x);
            let rhs = eval(&condition.rhs, x);
            if condition.cmp.holds(lhs, rhs) {
                eval(then, x)
            } else if lhs.is_nan() || rhs.is_nan() {
                f64::NAN
            } else {
                otherwise.as_ref().map_or(f64::NAN, |e| eval(e, x))
            }
        }
    }
}

pub fn unary_point_fn(op: UnaryOp) -> fn(f64) -> f64 {
    match op {
        UnaryOp::Sqrt => f64::sqrt,
        UnaryOp::Exp => f64::exp,
        UnaryOp::Ln => f64::ln,
        UnaryOp::Log10 => f64::log10,
        UnaryOp::Log2 => f64::log2,
        UnaryOp::Abs => f64::abs,
        UnaryOp::Sin => f64::sin,
        UnaryOp::Cos => f64::cos,
        UnaryOp::Tan => f64::tan,
        UnaryOp::Sec => |v: f64| 1.0 / v.cos(),
        UnaryOp::Csc => |v: f64| 1.0 / v.sin(),
        UnaryOp::Cot => |v: f64| 1.0 / v.tan(),
        UnaryOp::Asin => f64::asin,
        UnaryOp::Acos => f64::acos,
        UnaryOp::Atan => f64::atan,
        UnaryOp::Sinh => f64::sinh,
        UnaryOp::Cosh => f64::cosh,
        UnaryOp::Tanh => f64::tanh,
        UnaryOp::Floor => f64::floor,
        UnaryOp::Ceil => f64::ceil,
        UnaryOp::Round => f64::round,
        // f64::signum maps 0 to 1
        UnaryOp::Sgn => |v: f64| if v == 0.0 { 0.0 } else { v.signum() },
    }
}

pub fn binary_point_fn(op: BinaryOp) -> fn(f64, f64) -> f64 {
    match op {
        BinaryOp::Plus => |a: f64, b: f64| a + b,
        BinaryOp::Minus => |a: f64, b: f64| a - b,
        BinaryOp::Multiply => |a: f64, b: f64| a * b,
        BinaryOp::Divide => |a: f64, b: f64| a / b,
        BinaryOp::Power => f64::powf,
        BinaryOp::NRoot => nroot,
        BinaryOp::Min => f64::min,
        BinaryOp::Max => f64::max,
    }
}

fn nroot(v: f64, n: f64) -> f64 {
    if v < 0.0 && n.fract() == 0.0 && n % 2.0 != 0.0 {
        -(-v).powf(1.0 / n)
    } else {
        v.powf(1.0 / n)
    }
}
