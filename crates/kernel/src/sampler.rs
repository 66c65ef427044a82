use serde::Serialize;
use tracing::debug;

use crate::error::SampleError;
use crate::eval::eval;
use crate::expr::Expr;
use crate::function::IntervalFunction;
use crate::interval::Interval;
use crate::tuple::{IntervalTuple, IntervalTupleList};

pub const DEFAULT_MAX_PIECES: usize = 4096;

/// Piece indices stay within the range where `f64` holds every integer.
const MAX_PIECE_INDEX: f64 = 9_007_199_254_740_992.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    Rigorous,
    /// The tree was rejected by the support filter; pieces carry the value
    /// at their midpoint.
    PointFallback,
}

/// Samples one curve on a fixed grid of equal pieces and keeps the samples
/// in an [`IntervalTupleList`].
///
/// Piece `k` covers `[origin + k * step, origin + (k + 1) * step]`. Panning
/// keeps the grid, so pieces still on screen are reused as they are.
#[derive(Clone, Debug)]
pub struct IntervalSampler {
    expr: Expr,
    function: Option<IntervalFunction>,
    origin: f64,
    step: f64,
    first: i64,
    end: i64,
    max_pieces: usize,
    samples: IntervalTupleList,
}

impl IntervalSampler {
    pub fn new(expr: Expr, domain: Interval, pieces: usize) -> Result<Self, SampleError> {
        Self::with_max_pieces(expr, domain, pieces, DEFAULT_MAX_PIECES)
    }

    pub fn with_max_pieces(
        expr: Expr,
        domain: Interval,
        pieces: usize,
        max_pieces: usize,
    ) -> Result<Self, SampleError> {
        check_domain(domain)?;
        if pieces == 0 {
            return Err(SampleError::NoPieces);
        }
        if pieces > max_pieces {
            return Err(SampleError::TooManyPieces {
                requested: pieces,
                limit: max_pieces,
            });
        }
        let step = domain.width() / pieces as f64;
        if !step.is_finite() || step <= 0.0 {
            return Err(SampleError::InvalidDomain(domain));
        }
        let function = rigorous(&expr);
        let mut sampler = Self {
            expr,
            function,
            origin: domain.low(),
            step,
            first: 0,
            end: pieces as i64,
            max_pieces,
            samples: IntervalTupleList::new(),
        };
        sampler.samples = sampler.sample_range(sampler.first, sampler.end);
        debug!(pieces, mode = ?sampler.mode(), "sampled {}", sampler.domain());
        Ok(sampler)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn samples(&self) -> &IntervalTupleList {
        &self.samples
    }

    pub fn mode(&self) -> SamplingMode {
        if self.function.is_some() {
            SamplingMode::Rigorous
        } else {
            SamplingMode::PointFallback
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> Interval {
        Interval::new(self.edge(self.first), self.edge(self.end))
    }

    /// Moves the window to cover `domain`, evaluating only the pieces that
    /// were not covered before. Returns the number of pieces evaluated.
    pub fn pan(&mut self, domain: Interval) -> Result<usize, SampleError> {
        check_domain(domain)?;
        let (Some(first), Some(end)) = (
            self.piece_index(domain.low(), f64::floor),
            self.piece_index(domain.high(), f64::ceil),
        ) else {
            return Err(SampleError::InvalidDomain(domain));
        };
        let end = end.max(first.saturating_add(1));
        let requested = usize::try_from(end.saturating_sub(first)).unwrap_or(usize::MAX);
        if requested > self.max_pieces {
            return Err(SampleError::TooManyPieces {
                requested,
                limit: self.max_pieces,
            });
        }

        let mut evaluated = 0;
        if end <= self.first || first >= self.end {
            self.samples = self.sample_range(first, end);
            evaluated = requested;
        } else {
            if first < self.first {
                let head = self.sample_range(first, self.first);
                evaluated += head.count();
                self.samples.prepend(head);
            }
            if end > self.end {
                let tail = self.sample_range(self.end, end);
                evaluated += tail.count();
                self.samples.append(tail);
            }
            self.samples.cut_to(self.edge(first));
            self.samples.cut_from(self.edge(end));
        }
        self.first = first;
        self.end = end;
        debug_assert!(self.samples.is_ascending());
        debug!(evaluated, kept = self.samples.count(), "panned to {}", self.domain());
        Ok(evaluated)
    }

    pub fn reset(&mut self, expr: Expr) {
        self.function = rigorous(&expr);
        self.expr = expr;
        self.samples.clear();
        self.samples = self.sample_range(self.first, self.end);
    }

    fn piece_index(&self, v: f64, round: fn(f64) -> f64) -> Option<i64> {
        let k = round((v - self.origin) / self.step);
        (k.is_finite() && k.abs() <= MAX_PIECE_INDEX).then_some(k as i64)
    }

    fn edge(&self, k: i64) -> f64 {
        self.origin + k as f64 * self.step
    }

    fn sample_range(&self, from: i64, to: i64) -> IntervalTupleList {
        (from..to).map(|k| self.sample_piece(k)).collect()
    }

    fn sample_piece(&self, k: i64) -> IntervalTuple {
        let x = Interval::new(self.edge(k), self.edge(k + 1));
        let y = match &self.function {
            Some(function) => match function.evaluate(x) {
                Ok(y) => Some(y),
                Err(err) => {
                    debug!(%err, "piece {x} left empty");
                    None
                }
            },
            None => {
                let v = eval(&self.expr, 0.5 * (x.low() + x.high()));
                v.is_finite().then(|| Interval::singleton(v))
            }
        };
        IntervalTuple::new(x, y)
    }
}

fn rigorous(expr: &Expr) -> Option<IntervalFunction> {
    match IntervalFunction::new(expr.clone()) {
        Ok(function) => Some(function),
        Err(err) => {
            debug!(%err, "falling back to point sampling for {expr}");
            None
        }
    }
}

fn check_domain(domain: Interval) -> Result<(), SampleError> {
    if domain.is_undefined()
        || !domain.low().is_finite()
        || !domain.high().is_finite()
        || !domain.width().is_finite()
        || domain.width() <= 0.0
    {
        return Err(SampleError::InvalidDomain(domain));
    }
    Ok(())
}
