// File: crates/chart-axis/src/view.rs
// First-class view state: visible x range and helpers for pan/zoom in pixel space.

use crate::scale::PixelTranslate;
use crate::types::AxisExtremes;
use crate::Chart;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub x_min: f64,
    pub x_max: f64,
}

impl ViewState {
    /// Current view window of the chart's x axis.
    pub fn from_chart(chart: &Chart) -> Self {
        let ext = chart.x_axis.extremes();
        Self { x_min: ext.min, x_max: ext.max }
    }

    /// Full data range of every series.
    pub fn from_data(chart: &Chart) -> Self {
        match data_range(chart) {
            Some(ext) => Self { x_min: ext.min, x_max: ext.max },
            None => Self { x_min: 0.0, x_max: 1.0 },
        }
    }

    pub fn apply_to_chart(&self, chart: &mut Chart) {
        chart.x_axis.set_extremes(self.x_min, self.x_max);
    }

    /// Shifts the window by `dx` pixels (positive drags the data right).
    /// On ordinal axes the shift counts points, not time.
    pub fn pan_by_pixels(&mut self, dx: f64, chart: &mut Chart) {
        let axis = &mut chart.x_axis;
        axis.extended_ordinal_table();
        let min = axis.untranslate(axis.translate(self.x_min) - dx);
        let max = axis.untranslate(axis.translate(self.x_max) - dx);
        if min.is_finite() && max.is_finite() && max > min {
            self.x_min = min;
            self.x_max = max;
        }
    }

    /// Zooms around `cursor_x`; `scroll > 0` zooms in.
    pub fn zoom_at_pixel(&mut self, scroll: f64, cursor_x: f64, chart: &Chart) {
        let axis = &chart.x_axis;
        let scale = axis.scale();
        let l = scale.left_px;
        let r = l + scale.length_px;
        let cx = cursor_x.clamp(l, r);
        let lin_min = axis.to_linear(self.x_min);
        let lin_max = axis.to_linear(self.x_max);
        let span = lin_max - lin_min;
        if !(span > 0.0) {
            return;
        }
        let anchor = lin_min + (cx - l) / scale.length_px * span;
        let factor = (1.0 - scroll).clamp(0.1, 10.0);
        let ratio = (anchor - lin_min) / span;
        let new_min = anchor - ratio * span * factor;
        let new_max = new_min + span * factor;
        let (min, max) = (axis.from_linear(new_min), axis.from_linear(new_max));
        if min.is_finite() && max.is_finite() && max > min {
            self.x_min = min;
            self.x_max = max;
        }
    }
}

/// Full x range over every series, `None` when no series has points.
pub fn data_range(chart: &Chart) -> Option<AxisExtremes> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    for s in &chart.series {
        if let Some((lo, hi)) = s.x_extent() {
            x_min = x_min.min(lo);
            x_max = x_max.max(hi);
        }
    }
    if !x_min.is_finite() || !x_max.is_finite() {
        return None;
    }
    if (x_max - x_min).abs() < 1e-9 { x_max = x_min + 1.0; }
    Some(AxisExtremes::from_data(x_min, x_max))
}
