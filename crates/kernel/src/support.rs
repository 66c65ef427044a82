use crate::expr::{BinaryOp, Expr, Operation};
use crate::function::{binary_interval_fn, unary_interval_fn};

/// Powers with an exponent of this magnitude or more are left to point
/// sampling; the interval bounds blow up numerically.
pub const MAX_EXPONENT: f64 = 100.0;

/// Decides, node by node, whether interval evaluation can handle a tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedOperatorChecker;

impl UnsupportedOperatorChecker {
    /// True when `node` itself (ignoring its children) is unsupported.
    pub fn check(&self, node: &Expr) -> bool {
        match (node.operation(), node) {
            (Operation::NoOperation | Operation::Diff | Operation::If | Operation::IfElse, _) => false,
            (Operation::Unary(op), _) => unary_interval_fn(op).is_none(),
            (Operation::Binary(BinaryOp::Multiply), Expr::Binary(_, a, b)) => a.is_vector() ^ b.is_vector(),
            (Operation::Binary(BinaryOp::Power), Expr::Binary(_, _, exponent)) => {
                unsupported_exponent(exponent)
            }
            (Operation::Binary(op), _) => binary_interval_fn(op).is_none(),
        }
    }
}

fn unsupported_exponent(exponent: &Expr) -> bool {
    let power = exponent.evaluate_constant();
    power.is_nan() || exponent.contains_variable() || power.abs() >= MAX_EXPONENT
}

/// Whether `expr` or any node within it is unsupported by interval
/// evaluation. Callers fall back to point sampling for such trees.
pub fn is_unsupported(expr: &Expr) -> bool {
    first_unsupported(expr).is_some()
}

/// Operation of the first unsupported node in pre-order.
pub fn first_unsupported(expr: &Expr) -> Option<Operation> {
    let checker = UnsupportedOperatorChecker;
    let mut found = None;
    expr.inspect(&mut |node| {
        let bad = checker.check(node);
        if bad {
            found = Some(node.operation());
        }
        bad
    });
    found
}
