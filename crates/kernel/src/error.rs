use thiserror::Error;

use crate::expr::Operation;
use crate::interval::Interval;

pub type EvalResult<T> = Result<T, EvalError>;

/// Reasons an expression cannot be evaluated at all.
///
/// Domain failures (roots of negative numbers, poles, ...) are not errors:
/// they produce [`Interval::UNDEFINED`] and travel through the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("operation `{0}` is not supported by interval evaluation")]
    Unsupported(Operation),

    #[error("expression is vector-valued where a number is expected")]
    VectorValued,

    #[error("vectors of dimension {0} and {1} cannot be combined")]
    DimensionMismatch(usize, usize),

    #[error("{0} does not fit a 64-bit integer")]
    IntegerOverflow(f64),

    #[error("operation `{0}` cannot be differentiated")]
    NotDifferentiable(Operation),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("cannot sample over {0}: the domain must be bounded with positive width")]
    InvalidDomain(Interval),

    #[error("at least one piece is needed to sample a domain")]
    NoPieces,

    #[error("{requested} pieces requested, the limit is {limit}")]
    TooManyPieces { requested: usize, limit: usize },
}

/// A syntax error with the byte offset where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}
