use std::f64::consts::{E, FRAC_PI_2, PI, TAU};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Integer powers above this are delegated to `f64::powf` instead of
/// multiplying the bound out one factor at a time.
const MAX_REPEATED_PRODUCT: u64 = 1024;

/// Closed real interval `[lo, hi]`.
///
/// The undefined interval stands for "no real value exists" (root of a
/// negative number, reciprocal across zero, ...). It absorbs: any operation
/// with an undefined operand is undefined.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub const UNDEFINED: Self = Self {
        lo: f64::NAN,
        hi: f64::NAN,
    };

    pub fn new(lo: f64, hi: f64) -> Self {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            Self::UNDEFINED
        } else {
            Self { lo, hi }
        }
    }

    pub fn singleton(v: f64) -> Self {
        Self::new(v, v)
    }

    pub fn zero() -> Self {
        Self::singleton(0.0)
    }

    pub fn one() -> Self {
        Self::singleton(1.0)
    }

    pub fn whole() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn undefined() -> Self {
        Self::UNDEFINED
    }

    pub fn low(self) -> f64 {
        self.lo
    }

    pub fn high(self) -> f64 {
        self.hi
    }

    pub fn is_undefined(self) -> bool {
        self.lo.is_nan() || self.hi.is_nan()
    }

    pub fn is_singleton(self) -> bool {
        !self.is_undefined() && self.lo == self.hi
    }

    pub fn is_singleton_integer(self) -> bool {
        self.is_singleton() && self.lo.is_finite() && self.lo.fract() == 0.0
    }

    pub fn is_positive(self) -> bool {
        !self.is_undefined() && self.lo > 0.0
    }

    pub fn is_negative(self) -> bool {
        !self.is_undefined() && self.hi < 0.0
    }

    pub fn is_zero(self) -> bool {
        self.is_singleton() && self.lo == 0.0
    }

    /// Bit-exact singleton `{e}`; a value merely close to `e` does not count.
    pub fn is_exactly_e(self) -> bool {
        self.is_singleton() && self.lo.to_bits() == E.to_bits()
    }

    pub fn contains(self, v: f64) -> bool {
        !self.is_undefined() && self.lo <= v && v <= self.hi
    }

    pub fn width(self) -> f64 {
        self.hi - self.lo
    }

    /// Smallest interval containing both. Unlike the arithmetic this treats
    /// undefined as the empty set, so branches that are only partly defined
    /// still contribute their defined part.
    pub fn hull(self, other: Self) -> Self {
        match (self.is_undefined(), other.is_undefined()) {
            (true, _) => other,
            (_, true) => self,
            _ => Self::new(self.lo.min(other.lo), self.hi.max(other.hi)),
        }
    }

    fn from_corners(values: [f64; 4]) -> Self {
        if values.iter().any(|v| v.is_nan()) {
            return Self::UNDEFINED;
        }
        Self::new(
            values.iter().fold(f64::INFINITY, |m, v| m.min(*v)),
            values.iter().fold(f64::NEG_INFINITY, |m, v| m.max(*v)),
        )
    }

    pub fn negative(self) -> Self {
        Self::new(-self.hi, -self.lo)
    }

    /// `1 / self`. A bound of exactly zero maps to the matching infinity;
    /// `{0}` and intervals strictly around zero have no reciprocal.
    pub fn multiplicative_inverse(self) -> Self {
        if self.is_undefined() || spans_zero(self) {
            return Self::UNDEFINED;
        }
        if self.lo == 0.0 {
            Self::new(1.0 / self.hi, f64::INFINITY)
        } else if self.hi == 0.0 {
            Self::new(f64::NEG_INFINITY, 1.0 / self.lo)
        } else {
            Self::new(1.0 / self.hi, 1.0 / self.lo)
        }
    }

    /// Integer power. Bounds are multiplied out factor by factor, so for an
    /// interval that does not straddle zero the result is exactly the
    /// `n`-fold product `self * self * ... * self`.
    pub fn powi(self, n: i64) -> Self {
        if self.is_undefined() {
            return self;
        }
        if n == 0 {
            return Self::one();
        }
        if n < 0 {
            return self.powu(n.unsigned_abs()).multiplicative_inverse();
        }
        self.powu(n.unsigned_abs())
    }

    fn powu(self, n: u64) -> Self {
        let lo = repeated_product(self.lo, n);
        let hi = repeated_product(self.hi, n);
        if n % 2 == 1 || self.lo >= 0.0 {
            Self::new(lo, hi)
        } else if self.hi <= 0.0 {
            Self::new(hi, lo)
        } else {
            Self::new(0.0, lo.max(hi))
        }
    }

    pub fn powf(self, p: f64) -> Self {
        if self.is_undefined() || p.is_nan() {
            return Self::UNDEFINED;
        }
        if let Some(n) = exact_integer(p) {
            return self.powi(n);
        }
        if self.hi < 0.0 {
            return Self::UNDEFINED;
        }
        let lo = self.lo.max(0.0);
        if p > 0.0 {
            Self::new(lo.powf(p), self.hi.powf(p))
        } else if self.hi == 0.0 {
            Self::UNDEFINED
        } else {
            Self::new(self.hi.powf(p), lo.powf(p))
        }
    }

    pub fn pow(self, exponent: Self) -> Self {
        if self.is_undefined() || exponent.is_undefined() {
            return Self::UNDEFINED;
        }
        if exponent.is_singleton() {
            return self.powf(exponent.lo);
        }
        if self.hi < 0.0 {
            return Self::UNDEFINED;
        }
        // x^y is monotone in each argument on x >= 0, so the extremes sit on
        // the corners.
        let lo = self.lo.max(0.0);
        Self::from_corners([
            lo.powf(exponent.lo),
            lo.powf(exponent.hi),
            self.hi.powf(exponent.lo),
            self.hi.powf(exponent.hi),
        ])
    }

    pub fn sqrt(self) -> Self {
        self.nth_root(2)
    }

    pub fn nth_root(self, n: i64) -> Self {
        if self.is_undefined() || n == 0 {
            return Self::UNDEFINED;
        }
        if n < 0 {
            return self.root_u(n.unsigned_abs()).multiplicative_inverse();
        }
        self.root_u(n.unsigned_abs())
    }

    fn root_u(self, n: u64) -> Self {
        let p = 1.0 / n as f64;
        if n % 2 == 0 || self.lo >= 0.0 {
            self.powf(p)
        } else if self.hi <= 0.0 {
            self.negative().powf(p).negative()
        } else {
            Self::new(-(-self.lo).powf(p), self.hi.powf(p))
        }
    }

    /// `n`-th root with the order itself given as an interval; only integer
    /// singletons name a root.
    pub fn nroot(self, n: Self) -> Self {
        let order = if n.is_singleton_integer() {
            exact_integer(n.lo)
        } else {
            None
        };
        order.map_or(Self::UNDEFINED, |order| self.nth_root(order))
    }

    pub fn exp(self) -> Self {
        Self::new(self.lo.exp(), self.hi.exp())
    }

    pub fn ln(self) -> Self {
        self.log_with(f64::ln)
    }

    pub fn log10(self) -> Self {
        self.log_with(f64::log10)
    }

    pub fn log2(self) -> Self {
        self.log_with(f64::log2)
    }

    fn log_with(self, f: fn(f64) -> f64) -> Self {
        if self.is_undefined() || self.hi <= 0.0 {
            return Self::UNDEFINED;
        }
        Self::new(f(self.lo.max(0.0)), f(self.hi))
    }

    pub fn abs(self) -> Self {
        if self.lo >= 0.0 {
            self
        } else if self.hi <= 0.0 {
            self.negative()
        } else {
            Self::new(0.0, self.hi.max(-self.lo))
        }
    }

    pub fn sin(self) -> Self {
        self.periodic_range(f64::sin, FRAC_PI_2, -FRAC_PI_2)
    }

    pub fn cos(self) -> Self {
        self.periodic_range(f64::cos, 0.0, PI)
    }

    /// Range of a `2π`-periodic unit wave with its maximum at `peak` and its
    /// minimum at `trough`.
    fn periodic_range(self, f: fn(f64) -> f64, peak: f64, trough: f64) -> Self {
        if self.is_undefined() {
            return self;
        }
        if !self.lo.is_finite() || !self.hi.is_finite() || self.width() >= TAU {
            return Self::new(-1.0, 1.0);
        }
        let (a, b) = (f(self.lo), f(self.hi));
        let hi = if self.contains_phase(peak, TAU) { 1.0 } else { a.max(b) };
        let lo = if self.contains_phase(trough, TAU) { -1.0 } else { a.min(b) };
        Self::new(lo.max(-1.0), hi.min(1.0))
    }

    fn contains_phase(self, phase: f64, period: f64) -> bool {
        let k = ((self.lo - phase) / period).ceil();
        phase + k * period <= self.hi
    }

    /// Undefined across a pole, like any other reciprocal across zero.
    pub fn tan(self) -> Self {
        if self.is_undefined() || !self.is_finite() || self.contains_phase(FRAC_PI_2, PI) {
            return Self::UNDEFINED;
        }
        Self::new(self.lo.tan(), self.hi.tan())
    }

    pub fn cot(self) -> Self {
        if self.is_undefined() || !self.is_finite() || self.contains_phase(0.0, PI) {
            return Self::UNDEFINED;
        }
        Self::new(1.0 / self.hi.tan(), 1.0 / self.lo.tan())
    }

    pub fn sec(self) -> Self {
        self.cos().multiplicative_inverse()
    }

    pub fn csc(self) -> Self {
        self.sin().multiplicative_inverse()
    }

    pub fn asin(self) -> Self {
        if self.is_undefined() || self.hi < -1.0 || self.lo > 1.0 {
            return Self::UNDEFINED;
        }
        Self::new(self.lo.max(-1.0).asin(), self.hi.min(1.0).asin())
    }

    pub fn acos(self) -> Self {
        if self.is_undefined() || self.hi < -1.0 || self.lo > 1.0 {
            return Self::UNDEFINED;
        }
        Self::new(self.hi.min(1.0).acos(), self.lo.max(-1.0).acos())
    }

    pub fn atan(self) -> Self {
        Self::new(self.lo.atan(), self.hi.atan())
    }

    pub fn sinh(self) -> Self {
        Self::new(self.lo.sinh(), self.hi.sinh())
    }

    pub fn cosh(self) -> Self {
        let a = self.abs();
        Self::new(a.lo.cosh(), a.hi.cosh())
    }

    pub fn tanh(self) -> Self {
        Self::new(self.lo.tanh(), self.hi.tanh())
    }

    fn is_finite(self) -> bool {
        self.lo.is_finite() && self.hi.is_finite()
    }
}

fn spans_zero(v: Interval) -> bool {
    v.is_zero() || (v.lo < 0.0 && v.hi > 0.0)
}

/// Product of two bounds with `0 * inf = 0`.
fn mul_bound(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        0.0
    } else {
        a * b
    }
}

fn repeated_product(v: f64, n: u64) -> f64 {
    if n > MAX_REPEATED_PRODUCT {
        return v.powf(n as f64);
    }
    let mut acc = v;
    for _ in 1..n {
        acc *= v;
    }
    acc
}

pub(crate) fn exact_integer(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_undefined(), other.is_undefined()) {
            (true, true) => true,
            (false, false) => self.lo == other.lo && self.hi == other.hi,
            _ => false,
        }
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_undefined() {
            state.write_u8(0);
            return;
        }
        state.write_u8(1);
        // -0.0 == 0.0, so both must hash alike
        for v in [self.lo, self.hi] {
            let v = if v == 0.0 { 0.0_f64 } else { v };
            state.write_u64(v.to_bits());
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            write!(f, "undefined")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

impl Add for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.lo + rhs.lo, self.hi + rhs.hi)
    }
}

impl Sub for Interval {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.lo - rhs.hi, self.hi - rhs.lo)
    }
}

impl Mul for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        if self.is_undefined() || rhs.is_undefined() {
            return Self::UNDEFINED;
        }
        Self::from_corners([
            mul_bound(self.lo, rhs.lo),
            mul_bound(self.lo, rhs.hi),
            mul_bound(self.hi, rhs.lo),
            mul_bound(self.hi, rhs.hi),
        ])
    }
}

impl Div for Interval {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        if self.is_undefined() || rhs.is_undefined() || spans_zero(rhs) {
            return Self::UNDEFINED;
        }
        if rhs.lo == 0.0 || rhs.hi == 0.0 {
            return self * rhs.multiplicative_inverse();
        }
        Self::from_corners([
            self.lo / rhs.lo,
            self.lo / rhs.hi,
            self.hi / rhs.lo,
            self.hi / rhs.hi,
        ])
    }
}

impl Neg for Interval {
    type Output = Self;
    fn neg(self) -> Self {
        self.negative()
    }
}
