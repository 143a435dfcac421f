// File: crates/chart-axis/src/series.rs
// Summary: Raw series model: series types, value channels, candles and view cropping.
// Notes:
// - Values are stored column-wise (one channel per logical value) so grouping
//   can feed each channel into its own bucket.
// - Constructors sort points by x; the engine assumes ascending coordinates.

use crate::approximation::Approximation;
use crate::error::{AxisError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SeriesType {
    Line,
    Area,
    Spline,
    Column,
    Candlestick,
    Ohlc,         // OHLC bar (no filled body)
    AreaRange,    // low/high band
    ColumnRange,  // low/high bars
}

impl SeriesType {
    /// Number of value channels per point.
    pub fn channels(self) -> usize {
        match self {
            SeriesType::Candlestick | SeriesType::Ohlc => 4,
            SeriesType::AreaRange | SeriesType::ColumnRange => 2,
            _ => 1,
        }
    }

    pub fn default_approximation(self) -> Approximation {
        match self {
            SeriesType::Column => Approximation::Sum,
            SeriesType::Candlestick | SeriesType::Ohlc => Approximation::Ohlc,
            SeriesType::AreaRange | SeriesType::ColumnRange => Approximation::Range,
            SeriesType::Line | SeriesType::Area | SeriesType::Spline => Approximation::Average,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub t: f64,  // time (displayed on X)
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

impl Candle {
    /// Construct a candle enforcing OHLC invariants:
    /// l <= min(o,c) and h >= max(o,c), and l <= h.
    pub fn try_new(t: f64, o: f64, h: f64, l: f64, c: f64) -> Result<Self> {
        let lo = o.min(c);
        let hi = o.max(c);
        if l > lo { return Err(AxisError::InvalidCandle("low above min(open,close)")); }
        if h < hi { return Err(AxisError::InvalidCandle("high below max(open,close)")); }
        if l > h { return Err(AxisError::InvalidCandle("low above high")); }
        Ok(Self { t, o, h, l, c })
    }
}

/// Values of one raw point; `None` marks an explicit null.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointValue {
    Single(Option<f64>),
    Range { low: Option<f64>, high: Option<f64> },
    Ohlc { open: Option<f64>, high: Option<f64>, low: Option<f64>, close: Option<f64> },
}

#[derive(Clone, Debug)]
pub struct Series {
    pub name: String,
    pub series_type: SeriesType,
    xs: Vec<f64>,
    channels: Vec<Vec<Option<f64>>>,
    /// Overrides the configured grouping approximation for this series.
    pub approximation: Option<Approximation>,
}

impl Series {
    pub fn new(series_type: SeriesType) -> Self {
        Self {
            name: String::new(),
            series_type,
            xs: Vec::new(),
            channels: vec![Vec::new(); series_type.channels()],
            approximation: None,
        }
    }

    /// Single-value points; for multi-channel types the value fills every channel.
    pub fn with_data(series_type: SeriesType, mut data: Vec<(f64, Option<f64>)>) -> Self {
        data.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut s = Self::new(series_type);
        for (x, y) in data {
            s.xs.push(x);
            for ch in &mut s.channels {
                ch.push(y);
            }
        }
        s
    }

    pub fn from_candles(candles: Vec<Candle>) -> Self {
        Self::from_candles_as(SeriesType::Candlestick, candles)
    }

    pub fn from_candles_as(series_type: SeriesType, mut candles: Vec<Candle>) -> Self {
        candles.sort_by(|a, b| a.t.total_cmp(&b.t));
        let mut s = Self::new(series_type);
        s.channels = vec![Vec::with_capacity(candles.len()); 4];
        for k in &candles {
            s.xs.push(k.t);
            s.channels[0].push(Some(k.o));
            s.channels[1].push(Some(k.h));
            s.channels[2].push(Some(k.l));
            s.channels[3].push(Some(k.c));
        }
        s
    }

    /// `(x, low, high)` points for range series.
    pub fn from_ranges(series_type: SeriesType, mut data: Vec<(f64, Option<f64>, Option<f64>)>) -> Self {
        data.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut s = Self::new(series_type);
        s.channels = vec![Vec::with_capacity(data.len()); 2];
        for (x, low, high) in data {
            s.xs.push(x);
            s.channels[0].push(low);
            s.channels[1].push(high);
        }
        s
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_approximation(mut self, approximation: Approximation) -> Self {
        self.approximation = Some(approximation);
        self
    }

    pub fn len(&self) -> usize { self.xs.len() }

    pub fn is_empty(&self) -> bool { self.xs.is_empty() }

    pub fn xs(&self) -> &[f64] { &self.xs }

    pub fn channels(&self) -> &[Vec<Option<f64>>] { &self.channels }

    pub fn point(&self, i: usize) -> Option<PointValue> {
        let ch = |c: usize| self.channels.get(c).and_then(|v| v.get(i)).copied().flatten();
        if i >= self.xs.len() {
            return None;
        }
        Some(match self.channels.len() {
            4 => PointValue::Ohlc { open: ch(0), high: ch(1), low: ch(2), close: ch(3) },
            2 => PointValue::Range { low: ch(0), high: ch(1) },
            _ => PointValue::Single(ch(0)),
        })
    }

    /// Smallest gap between consecutive x values.
    pub fn closest_point_range(&self) -> Option<f64> {
        self.xs.windows(2).map(|w| w[1] - w[0]).filter(|d| *d > 0.0).min_by(f64::total_cmp)
    }

    /// `(min, max)` of x.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        Some((*self.xs.first()?, *self.xs.last()?))
    }

    /// `(min, max)` over every numeric value.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        let mut it = self.channels.iter().flatten().flatten().copied().filter(|v| v.is_finite());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Index range of points inside `[min, max]` plus one neighbour on each side.
    pub fn crop_range(&self, min: f64, max: f64) -> std::ops::Range<usize> {
        let start = self.xs.partition_point(|&x| x < min).saturating_sub(1);
        let end = (self.xs.partition_point(|&x| x <= max) + 1).min(self.xs.len());
        start..end.max(start)
    }

    /// Number of points inside `[min, max]`.
    pub fn points_in_view(&self, min: f64, max: f64) -> usize {
        self.xs.partition_point(|&x| x <= max).saturating_sub(self.xs.partition_point(|&x| x < min))
    }
}
