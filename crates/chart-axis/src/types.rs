// File: crates/chart-axis/src/types.rs
// Summary: Shared types and tunable constants (extremes, tick heuristics).

/// Numeric bounds of an axis.
/// `min`/`max` are the current view window, `data_min`/`data_max` the full data range.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisExtremes {
    pub min: f64,
    pub max: f64,
    pub data_min: f64,
    pub data_max: f64,
}

impl AxisExtremes {
    pub const fn new(min: f64, max: f64, data_min: f64, data_max: f64) -> Self {
        Self { min, max, data_min, data_max }
    }

    /// View window equal to the full data range.
    pub const fn from_data(data_min: f64, data_max: f64) -> Self {
        Self::new(data_min, data_max, data_min, data_max)
    }

    /// Width of the view window.
    pub fn span(&self) -> f64 { self.max - self.min }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max >= self.min
    }
}

impl Default for AxisExtremes {
    fn default() -> Self {
        Self::from_data(0.0, 1.0)
    }
}

// Empirical tick heuristics. Tunable, not derived.

/// A candidate gap larger than this many closest distances starts a new tick segment.
pub const SEGMENT_GAP_FACTOR: f64 = 5.0;
/// Median tick distance below this fraction of the pixel interval is ignored.
pub const MEDIAN_DISCARD_FACTOR: f64 = 0.6;
/// Ticks closer than this fraction of the pixel interval (or median) are thinned.
pub const THINNING_FACTOR: f64 = 0.8;

/// Default pixel distance between ticks on a horizontal axis.
pub const DEFAULT_TICK_PIXEL_INTERVAL: f64 = 100.0;
/// Default pixel width of one data group.
pub const DEFAULT_GROUP_PIXEL_WIDTH: f64 = 2.0;

/// Rounds away binary noise by keeping 14 significant digits (e.g. `0.1 + 0.2` → `0.3`).
pub(crate) fn correct_float(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    format!("{:.13e}", x).parse::<f64>().unwrap_or(x)
}
