// File: crates/chart-axis/src/approximation.rs
// Summary: Reductions of a bucket of raw values into one grouped value (sum, average, ohlc, ...).

use std::fmt;
use std::sync::Arc;

use crate::series::SeriesType;
use crate::types::correct_float;

/// Outcome of reducing one bucket.
///
/// `Gap` (every contributing value was null) renders as a break in the line;
/// `NoData` (no raw points at all) emits no point.
#[derive(Clone, Debug, PartialEq)]
pub enum Aggregate<T> {
    Value(T),
    Gap,
    NoData,
}

impl<T> Aggregate<T> {
    pub fn is_value(&self) -> bool { matches!(self, Aggregate::Value(_)) }

    pub fn value(&self) -> Option<&T> {
        match self {
            Aggregate::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Aggregate<U> {
        match self {
            Aggregate::Value(v) => Aggregate::Value(f(v)),
            Aggregate::Gap => Aggregate::Gap,
            Aggregate::NoData => Aggregate::NoData,
        }
    }

    /// Numeric value or `None` for gaps and missing data.
    pub fn into_option(self) -> Option<T> {
        match self {
            Aggregate::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Numeric values of one channel collected for one group; nulls only raise a flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bucket {
    values: Vec<f64>,
    has_nulls: bool,
}

static EMPTY_BUCKET: Bucket = Bucket { values: Vec::new(), has_nulls: false };

impl Bucket {
    pub fn new() -> Self { Self::default() }

    pub fn from_values<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        let mut b = Self::new();
        for v in values {
            b.push(v);
        }
        b
    }

    /// Adds a raw value; `None` and non-finite values count as nulls.
    pub fn push(&mut self, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => self.values.push(v),
            None => self.has_nulls = true,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.has_nulls = false;
    }

    pub fn values(&self) -> &[f64] { &self.values }

    pub fn has_nulls(&self) -> bool { self.has_nulls }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    fn empty_outcome<T>(&self) -> Aggregate<T> {
        if self.has_nulls { Aggregate::Gap } else { Aggregate::NoData }
    }
}

/// A grouped point value: one number, or one entry per channel (ohlc, range, averages).
#[derive(Clone, Debug, PartialEq)]
pub enum GroupValue {
    Single(f64),
    Tuple(Vec<Option<f64>>),
}

impl GroupValue {
    /// First numeric component.
    pub fn primary(&self) -> Option<f64> {
        match self {
            GroupValue::Single(v) => Some(*v),
            GroupValue::Tuple(parts) => parts.iter().flatten().next().copied(),
        }
    }
}

pub fn sum(bucket: &Bucket) -> Aggregate<f64> {
    if bucket.is_empty() {
        return bucket.empty_outcome();
    }
    Aggregate::Value(bucket.values.iter().sum())
}

pub fn average(bucket: &Bucket) -> Aggregate<f64> {
    let n = bucket.values.len();
    sum(bucket).map(|s| correct_float(s / n as f64))
}

/// Element-wise average over several channels. Missing data in the first channel
/// means no point.
pub fn averages(buckets: &[Bucket]) -> Aggregate<Vec<Option<f64>>> {
    let parts: Vec<Aggregate<f64>> = buckets.iter().map(average).collect();
    match parts.first() {
        None | Some(Aggregate::NoData) => Aggregate::NoData,
        _ if parts.iter().all(|p| !p.is_value()) => Aggregate::Gap,
        _ => Aggregate::Value(parts.into_iter().map(Aggregate::into_option).collect()),
    }
}

pub fn open(bucket: &Bucket) -> Aggregate<f64> {
    match bucket.values.first() {
        Some(&v) => Aggregate::Value(v),
        None => bucket.empty_outcome(),
    }
}

pub fn close(bucket: &Bucket) -> Aggregate<f64> {
    match bucket.values.last() {
        Some(&v) => Aggregate::Value(v),
        None => bucket.empty_outcome(),
    }
}

pub fn high(bucket: &Bucket) -> Aggregate<f64> {
    if bucket.is_empty() {
        return bucket.empty_outcome();
    }
    Aggregate::Value(bucket.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn low(bucket: &Bucket) -> Aggregate<f64> {
    if bucket.is_empty() {
        return bucket.empty_outcome();
    }
    Aggregate::Value(bucket.values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// `[open, high, low, close]`, defined when any of the four is numeric.
pub fn ohlc(open_b: &Bucket, high_b: &Bucket, low_b: &Bucket, close_b: &Bucket) -> Aggregate<Vec<Option<f64>>> {
    let parts = [open(open_b), high(high_b), low(low_b), close(close_b)];
    if parts.iter().any(Aggregate::is_value) {
        Aggregate::Value(parts.into_iter().map(Aggregate::into_option).collect())
    } else {
        Aggregate::NoData
    }
}

/// `[low, high]`; a gap only when both channels were entirely null.
pub fn range(low_b: &Bucket, high_b: &Bucket) -> Aggregate<Vec<Option<f64>>> {
    let (lo, hi) = (low(low_b), high(high_b));
    if lo.is_value() || hi.is_value() {
        Aggregate::Value(vec![lo.into_option(), hi.into_option()])
    } else if lo == Aggregate::Gap && hi == Aggregate::Gap {
        Aggregate::Gap
    } else {
        Aggregate::NoData
    }
}

/// User supplied reduction over all channel buckets of one group.
pub type ApproximationFn = dyn Fn(&[Bucket]) -> Aggregate<GroupValue> + Send + Sync;

/// Reduction applied to each group.
#[derive(Clone)]
pub enum Approximation {
    Sum,
    Average,
    Averages,
    Open,
    High,
    Low,
    Close,
    Ohlc,
    Range,
    Custom(Arc<ApproximationFn>),
}

impl fmt::Debug for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Approximation {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[Bucket]) -> Aggregate<GroupValue> + Send + Sync + 'static,
    {
        Approximation::Custom(Arc::new(f))
    }

    /// Built-in approximation by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let a = match name.trim().to_ascii_lowercase().as_str() {
            "sum" => Approximation::Sum,
            "average" => Approximation::Average,
            "averages" => Approximation::Averages,
            "open" => Approximation::Open,
            "high" => Approximation::High,
            "low" => Approximation::Low,
            "close" => Approximation::Close,
            "ohlc" => Approximation::Ohlc,
            "range" => Approximation::Range,
            _ => return None,
        };
        Some(a)
    }

    /// Named approximation, falling back to the series type's default (and from
    /// there to `average`) for unknown or missing names.
    pub fn resolve(name: Option<&str>, series_type: SeriesType) -> Self {
        name.and_then(Self::from_name).unwrap_or_else(|| series_type.default_approximation())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Approximation::Sum => "sum",
            Approximation::Average => "average",
            Approximation::Averages => "averages",
            Approximation::Open => "open",
            Approximation::High => "high",
            Approximation::Low => "low",
            Approximation::Close => "close",
            Approximation::Ohlc => "ohlc",
            Approximation::Range => "range",
            Approximation::Custom(_) => "custom",
        }
    }

    /// Reduces the per-channel buckets of one group. Channels a reduction needs
    /// but the series lacks are treated as empty.
    pub fn apply(&self, buckets: &[Bucket]) -> Aggregate<GroupValue> {
        let ch = |i: usize| buckets.get(i).unwrap_or(&EMPTY_BUCKET);
        match self {
            Approximation::Sum => sum(ch(0)).map(GroupValue::Single),
            Approximation::Average => average(ch(0)).map(GroupValue::Single),
            Approximation::Averages => averages(buckets).map(GroupValue::Tuple),
            Approximation::Open => open(ch(0)).map(GroupValue::Single),
            Approximation::High => high(ch(0)).map(GroupValue::Single),
            Approximation::Low => low(ch(0)).map(GroupValue::Single),
            Approximation::Close => close(ch(0)).map(GroupValue::Single),
            Approximation::Ohlc => ohlc(ch(0), ch(1), ch(2), ch(3)).map(GroupValue::Tuple),
            Approximation::Range => range(ch(0), ch(1)).map(GroupValue::Tuple),
            Approximation::Custom(f) => f(buckets),
        }
    }
}
