use std::fmt;

use serde::{Deserialize, Serialize};

use crate::eval::eval;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Sqrt,
    Exp,
    Ln,
    Log10,
    Log2,
    Abs,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Sgn,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 22] = [
        UnaryOp::Sqrt,
        UnaryOp::Exp,
        UnaryOp::Ln,
        UnaryOp::Log10,
        UnaryOp::Log2,
        UnaryOp::Abs,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Sec,
        UnaryOp::Csc,
        UnaryOp::Cot,
        UnaryOp::Asin,
        UnaryOp::Acos,
        UnaryOp::Atan,
        UnaryOp::Sinh,
        UnaryOp::Cosh,
        UnaryOp::Tanh,
        UnaryOp::Floor,
        UnaryOp::Ceil,
        UnaryOp::Round,
        UnaryOp::Sgn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Log10 => "log10",
            UnaryOp::Log2 => "log2",
            UnaryOp::Abs => "abs",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Sec => "sec",
            UnaryOp::Csc => "csc",
            UnaryOp::Cot => "cot",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Round => "round",
            UnaryOp::Sgn => "sgn",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "log" => Some(UnaryOp::Ln),
            "arcsin" => Some(UnaryOp::Asin),
            "arccos" => Some(UnaryOp::Acos),
            "arctan" => Some(UnaryOp::Atan),
            _ => Self::ALL.into_iter().find(|op| op.name() == name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    NRoot,
    Min,
    Max,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::NRoot => "nroot",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }

    fn is_infix(self) -> bool {
        !matches!(self, BinaryOp::NRoot | BinaryOp::Min | BinaryOp::Max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessEq => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterEq => ">=",
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Less => lhs < rhs,
            Comparison::LessEq => lhs <= rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterEq => lhs >= rhs,
        }
    }
}

/// `lhs <cmp> rhs`, the guard of a conditional branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub lhs: Expr,
    pub cmp: Comparison,
    pub rhs: Expr,
}

/// Expression tree in the single evaluation variable `x`.
///
/// Unary minus has no node of its own: `-c` folds into `Const(-c)` and any
/// other negation is `(-1) * e`, which is the shape the power evaluator
/// looks for in `x^-(p/q)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(f64),
    X,
    Vector(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Derivative(Box<Expr>),
    If {
        condition: Box<Condition>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
}

/// Operator kind of a node; leaves report [`Operation::NoOperation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    NoOperation,
    Unary(UnaryOp),
    Binary(BinaryOp),
    Diff,
    If,
    IfElse,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::NoOperation => write!(f, "no-op"),
            Operation::Unary(op) => write!(f, "{}", op.name()),
            Operation::Binary(op) => write!(f, "{}", op.name()),
            Operation::Diff => write!(f, "diff"),
            Operation::If => write!(f, "if"),
            Operation::IfElse => write!(f, "if-else"),
        }
    }
}

impl Expr {
    pub fn c(v: f64) -> Self {
        Self::Const(v)
    }
    pub fn vector(items: Vec<Expr>) -> Self {
        Self::Vector(items)
    }
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }
    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Self::Unary(op, Box::new(arg))
    }
    pub fn add(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Plus, self, rhs)
    }
    pub fn sub(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Minus, self, rhs)
    }
    pub fn mul(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Multiply, self, rhs)
    }
    pub fn div(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Divide, self, rhs)
    }
    pub fn pow(self, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Power, self, rhs)
    }
    pub fn nroot(self, n: Expr) -> Self {
        Self::binary(BinaryOp::NRoot, self, n)
    }
    pub fn neg(self) -> Self {
        match self {
            Self::Const(c) => Self::Const(-c),
            other => Self::c(-1.0).mul(other),
        }
    }
    pub fn sqrt(self) -> Self {
        Self::unary(UnaryOp::Sqrt, self)
    }
    pub fn sin(self) -> Self {
        Self::unary(UnaryOp::Sin, self)
    }
    pub fn cos(self) -> Self {
        Self::unary(UnaryOp::Cos, self)
    }
    pub fn exp(self) -> Self {
        Self::unary(UnaryOp::Exp, self)
    }
    pub fn ln(self) -> Self {
        Self::unary(UnaryOp::Ln, self)
    }
    pub fn abs(self) -> Self {
        Self::unary(UnaryOp::Abs, self)
    }
    pub fn diff(self) -> Self {
        Self::Derivative(Box::new(self))
    }
    pub fn when(lhs: Expr, cmp: Comparison, rhs: Expr, then: Expr, otherwise: Option<Expr>) -> Self {
        Self::If {
            condition: Box::new(Condition { lhs, cmp, rhs }),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Expr::Const(_) | Expr::X | Expr::Vector(_) => Operation::NoOperation,
            Expr::Unary(op, _) => Operation::Unary(*op),
            Expr::Binary(op, _, _) => Operation::Binary(*op),
            Expr::Derivative(_) => Operation::Diff,
            Expr::If { otherwise: None, .. } => Operation::If,
            Expr::If { otherwise: Some(_), .. } => Operation::IfElse,
        }
    }

    /// First operand of a unary or binary node.
    pub fn left(&self) -> Option<&Expr> {
        match self {
            Expr::Unary(_, a) | Expr::Binary(_, a, _) | Expr::Derivative(a) => Some(a),
            _ => None,
        }
    }

    /// Second operand of a binary node.
    pub fn right(&self) -> Option<&Expr> {
        match self {
            Expr::Binary(_, _, b) => Some(b),
            _ => None,
        }
    }

    /// Anything but a bare leaf.
    pub fn is_compound(&self) -> bool {
        self.operation() != Operation::NoOperation
    }

    pub fn is_minus_one(&self) -> bool {
        matches!(self, Expr::Const(c) if *c == -1.0)
    }

    /// Whether `check` holds for this node or any node below it, including
    /// the operands of branch conditions.
    pub fn inspect(&self, check: &mut impl FnMut(&Expr) -> bool) -> bool {
        if check(self) {
            return true;
        }
        match self {
            Expr::Const(_) | Expr::X => false,
            Expr::Vector(items) => items.iter().any(|e| e.inspect(check)),
            Expr::Unary(_, a) | Expr::Derivative(a) => a.inspect(check),
            Expr::Binary(_, a, b) => a.inspect(check) || b.inspect(check),
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                condition.lhs.inspect(check)
                    || condition.rhs.inspect(check)
                    || then.inspect(check)
                    || otherwise.as_ref().is_some_and(|e| e.inspect(check))
            }
        }
    }

    pub fn contains_variable(&self) -> bool {
        self.inspect(&mut |e| matches!(e, Expr::X))
    }

    /// Whether the subtree evaluates to a vector rather than a number.
    /// A product of two vectors is their dot product, hence a number.
    pub fn is_vector(&self) -> bool {
        match self {
            Expr::Vector(_) => true,
            Expr::Binary(BinaryOp::Plus | BinaryOp::Minus, a, b) => a.is_vector() || b.is_vector(),
            Expr::Binary(BinaryOp::Multiply, a, b) => a.is_vector() ^ b.is_vector(),
            Expr::Binary(BinaryOp::Divide, a, _) => a.is_vector(),
            Expr::If { then, .. } => then.is_vector(),
            _ => false,
        }
    }

    /// Numeric value of a constant subtree; NaN when it depends on `x` or
    /// has no real value.
    pub fn evaluate_constant(&self) -> f64 {
        eval(self, f64::NAN)
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    match e {
        Expr::Const(c) if *c < 0.0 => write!(f, "({c})"),
        Expr::Binary(op, _, _) if op.is_infix() => write!(f, "({e})"),
        _ => write!(f, "{e}"),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::X => write!(f, "x"),
            Expr::Vector(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Expr::Unary(op, a) => write!(f, "{}({a})", op.name()),
            Expr::Binary(op, a, b) if op.is_infix() => {
                write_operand(f, a)?;
                write!(f, " {} ", op.name())?;
                write_operand(f, b)
            }
            Expr::Binary(op, a, b) => write!(f, "{}({a}, {b})", op.name()),
            Expr::Derivative(a) => write!(f, "diff({a})"),
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                write!(
                    f,
                    "if({} {} {}, {then}",
                    condition.lhs,
                    condition.cmp.symbol(),
                    condition.rhs
                )?;
                if let Some(otherwise) = otherwise {
                    write!(f, ", {otherwise}")?;
                }
                write!(f, ")")
            }
        }
    }
}
