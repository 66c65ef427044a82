use std::fmt;

use crate::interval::Interval;

/// One rigorous sample: the enclosure `y` of a function over `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntervalTuple {
    x: Interval,
    y: Option<Interval>,
}

impl IntervalTuple {
    pub fn new(x: Interval, y: Option<Interval>) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> Interval {
        self.x
    }

    pub fn y(&self) -> Option<Interval> {
        self.y
    }

    /// A `y` that is present and defined.
    pub fn has_value(&self) -> bool {
        self.y.is_some_and(|y| !y.is_undefined())
    }
}

impl fmt::Display for IntervalTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.y {
            Some(y) => write!(f, "({}, {})", self.x, y),
            None => write!(f, "({}, -)", self.x),
        }
    }
}

/// Cache of samples for one plotted curve, kept in ascending `x` order.
///
/// The order is maintained by the caller: `add`, `append` and `prepend` do
/// not sort. Panning extends the cache at either end and trims samples that
/// left the viewport, so only newly exposed ranges get evaluated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntervalTupleList {
    tuples: Vec<IntervalTuple>,
}

impl IntervalTupleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tuple: IntervalTuple) {
        self.tuples.push(tuple);
    }

    pub fn get(&self, index: usize) -> Option<&IntervalTuple> {
        self.tuples.get(index)
    }

    pub fn value_at(&self, index: usize) -> Option<Interval> {
        self.get(index).and_then(IntervalTuple::y)
    }

    pub fn count(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn clear(&mut self) {
        self.tuples.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IntervalTuple> {
        self.tuples.iter()
    }

    pub fn first(&self) -> Option<&IntervalTuple> {
        self.tuples.first()
    }

    pub fn last(&self) -> Option<&IntervalTuple> {
        self.tuples.last()
    }

    fn is_all_undefined(&self) -> bool {
        !self.tuples.iter().any(IntervalTuple::has_value)
    }

    /// Adds `other` at the tail. Lists without a single defined sample are
    /// ignored.
    pub fn append(&mut self, other: IntervalTupleList) {
        if other.is_empty() || other.is_all_undefined() {
            return;
        }
        self.tuples.extend(other.tuples);
    }

    /// Adds `other` at the head, under the same rule as [`Self::append`].
    pub fn prepend(&mut self, other: IntervalTupleList) {
        if other.is_empty() || other.is_all_undefined() {
            return;
        }
        self.tuples.splice(0..0, other.tuples);
    }

    /// Keeps the samples whose `x` ends at or before `high`.
    pub fn cut_from(&mut self, high: f64) {
        self.tuples.retain(|t| t.x.high() <= high);
    }

    /// Keeps the samples whose `x` starts at or after `low`.
    pub fn cut_to(&mut self, low: f64) {
        self.tuples.retain(|t| t.x.low() >= low);
    }

    /// Whether the `x` intervals are in ascending order.
    pub fn is_ascending(&self) -> bool {
        self.tuples
            .windows(2)
            .all(|w| w[0].x.low() <= w[1].x.low() && w[0].x.high() <= w[1].x.high())
    }
}

impl From<Vec<IntervalTuple>> for IntervalTupleList {
    fn from(tuples: Vec<IntervalTuple>) -> Self {
        Self { tuples }
    }
}

impl FromIterator<IntervalTuple> for IntervalTupleList {
    fn from_iter<I: IntoIterator<Item = IntervalTuple>>(iter: I) -> Self {
        Self {
            tuples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IntervalTupleList {
    type Item = &'a IntervalTuple;
    type IntoIter = std::slice::Iter<'a, IntervalTuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl fmt::Display for IntervalTupleList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tuple in &self.tuples {
            write!(f, "{tuple}")?;
        }
        Ok(())
    }
}
