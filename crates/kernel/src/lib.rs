//! Interval enclosures of one-variable expressions for rigorous plotting.

pub mod derivative;
pub mod error;
pub mod eval;
pub mod expr;
pub mod function;
pub mod interval;
pub mod parse;
pub mod power;
pub mod sampler;
pub mod support;
pub mod tuple;

#[cfg(test)]
mod tests;
