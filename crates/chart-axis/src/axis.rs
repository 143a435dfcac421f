// File: crates/chart-axis/src/axis.rs
// Summary: Axis model: options, extremes, geometry and the optional ordinal/break behaviors.

use tracing::{debug, trace};

use crate::breaks::{Break, BreakBehavior};
use crate::error::{AxisError, Result};
use crate::ordinal::{self, GroupingSignature, OrdinalBehavior, OrdinalOptions, OrdinalTable};
use crate::scale::{AxisTransform, PixelScale, PixelTranslate};
use crate::ticks::{LinearTickGenerator, TickSegmenter, TickSet, TimeTickGenerator};
use crate::time::{self, NormalizedInterval};
use crate::types::{AxisExtremes, DEFAULT_TICK_PIXEL_INTERVAL};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScaleKind {
    Linear,
    DateTime,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AxisOptions {
    pub kind: ScaleKind,
    /// Space points evenly by index instead of by value.
    pub ordinal: bool,
    /// Excluded ranges; any active break turns ordinal spacing off.
    pub breaks: Vec<Break>,
    pub tick_pixel_interval: f64,
    /// Range past the last point the axis may scroll into.
    pub overscroll: f64,
    /// First day of the week for weekly ticks, Sunday = 0.
    pub start_of_week: u32,
    pub keep_ordinal_padding: bool,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            kind: ScaleKind::DateTime,
            ordinal: true,
            breaks: Vec::new(),
            tick_pixel_interval: DEFAULT_TICK_PIXEL_INTERVAL,
            overscroll: 0.0,
            start_of_week: 1,
            keep_ordinal_padding: false,
        }
    }
}

/// Counters bumped on raw data replacement and on extremes changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisVersions {
    pub data: u64,
    pub extremes: u64,
}

#[derive(Clone, Debug)]
pub struct Axis {
    pub label: String,
    options: AxisOptions,
    extremes: AxisExtremes,
    user_extremes: Option<(f64, f64)>,
    left_px: f64,
    length_px: f64,
    ordinal: Option<OrdinalBehavior>,
    breaks: Option<BreakBehavior>,
    versions: AxisVersions,
    built: Option<AxisVersions>,
    positions: Vec<f64>,
    closest_point_range: Option<f64>,
    /// Group spacing while the ordinal index follows group starts.
    grouped_closest: Option<f64>,
    scale: PixelScale,
}

impl Axis {
    pub fn new(label: impl Into<String>, options: AxisOptions) -> Self {
        let breaks = BreakBehavior::new(options.breaks.clone());
        let breaks = breaks.is_active().then_some(breaks);
        let ordinal = (options.ordinal && breaks.is_none()).then(|| {
            OrdinalBehavior::new(OrdinalOptions {
                keep_padding: options.keep_ordinal_padding,
                overscroll: options.overscroll,
                start_of_week: options.start_of_week,
            })
        });
        let extremes = AxisExtremes::default();
        Self {
            label: label.into(),
            options,
            extremes,
            user_extremes: None,
            left_px: 0.0,
            length_px: 800.0,
            ordinal,
            breaks,
            versions: AxisVersions::default(),
            built: None,
            positions: Vec::new(),
            closest_point_range: None,
            grouped_closest: None,
            scale: PixelScale::new(0.0, 800.0, extremes.min, extremes.max),
        }
    }

    /// Ordinal datetime axis.
    pub fn default_x() -> Self {
        Self::new("Time", AxisOptions::default())
    }

    pub fn options(&self) -> &AxisOptions { &self.options }

    pub fn extremes(&self) -> AxisExtremes { self.extremes }

    pub fn versions(&self) -> AxisVersions { self.versions }

    pub fn length_px(&self) -> f64 { self.length_px }

    pub fn left_px(&self) -> f64 { self.left_px }

    pub fn closest_point_range(&self) -> Option<f64> { self.closest_point_range }

    /// Spacing of the points currently on the axis: the group interval after
    /// grouping re-indexed it, the raw closest range otherwise.
    pub fn effective_closest_range(&self) -> Option<f64> { self.grouped_closest.or(self.closest_point_range) }

    pub fn ordinal(&self) -> Option<&OrdinalBehavior> { self.ordinal.as_ref() }

    pub fn breaks(&self) -> Option<&BreakBehavior> { self.breaks.as_ref() }

    /// Ordinal behavior configured and in use for the current data.
    pub fn is_ordinal(&self) -> bool { self.ordinal.as_ref().is_some_and(OrdinalBehavior::is_active) }

    pub fn has_breaks(&self) -> bool { self.breaks.is_some() }

    pub fn set_geometry(&mut self, left_px: f64, length_px: f64) -> Result<()> {
        if !(length_px.is_finite() && length_px > 0.0) {
            return Err(AxisError::InvalidAxisLength(length_px));
        }
        self.left_px = if left_px.is_finite() { left_px } else { 0.0 };
        self.length_px = length_px;
        self.refresh_scale();
        Ok(())
    }

    /// Signals that raw series data changed.
    pub fn mark_data_changed(&mut self) {
        self.versions.data += 1;
    }

    /// Sets the full data range; the view follows it unless the user set one.
    pub fn set_data_extremes(&mut self, data_min: f64, data_max: f64) {
        let (min, max) = self.user_extremes.unwrap_or((data_min, data_max));
        self.update_extremes(AxisExtremes::new(min, max, data_min, data_max));
    }

    /// Sets the view window. An extreme inside a break is pushed outward.
    pub fn set_extremes(&mut self, min: f64, max: f64) {
        if !(min.is_finite() && max.is_finite() && max >= min) {
            return;
        }
        let (min, max) = match (&self.breaks, self.closest_point_range) {
            (Some(b), Some(closest)) => b.clamp_extremes(min, max, closest),
            _ => (min, max),
        };
        self.user_extremes = Some((min, max));
        let ext = AxisExtremes::new(min, max, self.extremes.data_min, self.extremes.data_max);
        self.update_extremes(ext);
    }

    /// Drops the user view window; the view follows the data again.
    pub fn reset_extremes(&mut self) {
        self.user_extremes = None;
        let ext = AxisExtremes::from_data(self.extremes.data_min, self.extremes.data_max);
        self.update_extremes(ext);
    }

    fn update_extremes(&mut self, ext: AxisExtremes) {
        if ext != self.extremes {
            self.extremes = ext;
            self.versions.extremes += 1;
            trace!(min = ext.min, max = ext.max, version = self.versions.extremes, "axis extremes changed");
        }
    }

    /// Rebuilds the break table and ordinal index from the series coordinates.
    /// Skipped when neither data nor extremes changed since the last rebuild.
    pub fn rebuild<S: AsRef<[f64]>>(&mut self, coordinate_sets: &[S]) -> bool {
        if self.built == Some(self.versions) {
            return false;
        }
        self.positions = ordinal::merge_positions(coordinate_sets);
        self.closest_point_range = coordinate_sets
            .iter()
            .filter_map(|s| ordinal::closest_distance(s.as_ref()))
            .min_by(f64::total_cmp);
        self.grouped_closest = None;
        if let Some(b) = &mut self.breaks {
            b.rebuild(self.extremes.min, self.extremes.max);
        }
        if let Some(o) = &mut self.ordinal {
            o.rebuild(coordinate_sets, &self.extremes, self.versions.data);
        }
        self.refresh_scale();
        self.built = Some(self.versions);
        debug!(
            positions = self.positions.len(),
            ordinal = self.is_ordinal(),
            breaks = self.has_breaks(),
            data_version = self.versions.data,
            extremes_version = self.versions.extremes,
            "rebuilt axis tables"
        );
        true
    }

    fn refresh_scale(&mut self) {
        let lin_min = self.to_linear(self.extremes.min);
        let lin_max = self.to_linear(self.extremes.max);
        self.scale = PixelScale::new(self.left_px, self.length_px, lin_min, lin_max);
    }

    /// Re-indexes an ordinal axis on the grouped coordinates of its series.
    pub fn apply_grouping(&mut self, grouped_x: &[f64], signature: GroupingSignature) {
        let reindexed = match &mut self.ordinal {
            Some(o) => o.apply_grouping(grouped_x, signature, &self.extremes),
            None => false,
        };
        self.grouped_closest = if reindexed { signature.total_range() } else { None };
        self.refresh_scale();
    }

    /// Undoes [`apply_grouping`](Self::apply_grouping); the axis indexes raw coordinates again.
    pub fn reset_grouping(&mut self) {
        if let Some(o) = &mut self.ordinal {
            o.reset_grouping();
        }
        self.grouped_closest = None;
        self.refresh_scale();
    }

    /// Group interval factor for a representative series; 1 on non-ordinal axes.
    pub fn group_interval_factor(&mut self, xs: &[f64]) -> f64 {
        let ext = self.extremes;
        match &mut self.ordinal {
            Some(o) if o.is_active() => o.group_interval_factor(ext.min, ext.max, xs),
            _ => 1.0,
        }
    }

    /// Extended ordinal table for the current grouping, built on first use.
    pub fn extended_ordinal_table(&mut self) -> Option<&OrdinalTable> {
        self.ordinal.as_mut()?.extended_table()?;
        self.refresh_scale();
        self.ordinal.as_ref()?.cached_extended_table()
    }

    /// Value -> break compensation -> ordinal linearization.
    pub fn to_linear(&self, value: f64) -> f64 {
        let v = self.breaks.as_ref().map_or(value, |b| b.to_linear(value));
        self.ordinal.as_ref().map_or(v, |o| o.to_linear(v))
    }

    pub fn from_linear(&self, linear: f64) -> f64 {
        let v = self.ordinal.as_ref().map_or(linear, |o| o.from_linear(linear));
        self.breaks.as_ref().map_or(v, |b| b.from_linear(v))
    }

    pub fn scale(&self) -> &PixelScale { &self.scale }

    /// A point at `x` is hidden by a break that does not keep its points.
    pub fn is_point_hidden(&self, x: f64) -> bool {
        self.breaks.as_ref().is_some_and(|b| b.is_in_any_break(x, true))
    }

    /// Tick interval for the view in value units.
    pub fn tick_interval(&self) -> f64 {
        let tpi = self.options.tick_pixel_interval.max(1.0);
        let lin_span = self.scale.lin_max - self.scale.lin_min;
        let interval = lin_span * tpi / self.length_px;
        match (&self.ordinal, self.effective_closest_range()) {
            (Some(o), Some(closest)) => o.post_process_tick_interval(interval, closest),
            _ => interval,
        }
    }

    /// Tick positions for the current view, segmented at data gaps and thinned
    /// on ordinal or broken axes.
    pub fn tick_positions(&self) -> TickSet {
        let ext = self.extremes;
        let candidates: &[f64] = match &self.ordinal {
            Some(o) if o.is_active() => &o.table().positions,
            _ => &self.positions,
        };
        let closest = self.effective_closest_range().unwrap_or(0.0);
        let segmenter = TickSegmenter::for_ticks(self, self.options.tick_pixel_interval)
            .ordinal(self.is_ordinal())
            .breaks(self.breaks.as_ref());

        let ticks = match self.options.kind {
            ScaleKind::DateTime => {
                let interval = time::normalize_time_tick_interval(self.tick_interval(), &time::default_tick_units());
                let generator = TimeTickGenerator::new(interval, self.options.start_of_week);
                segmenter.compute(candidates, ext.min, ext.max, closest, &generator)
            }
            ScaleKind::Linear => {
                let generator = LinearTickGenerator::new(time::normalize_tick_interval(
                    self.tick_interval(),
                    None,
                    time::magnitude(self.tick_interval()),
                ));
                segmenter.compute(candidates, ext.min, ext.max, closest, &generator)
            }
        };
        debug!(ticks = ticks.len(), unit = ?ticks.info.unit, "computed tick positions");
        ticks
    }

    /// Group start positions covering `xs` at `interval`; segmented at data gaps
    /// on ordinal axes.
    pub fn group_positions(&self, xs: &[f64], x_min: f64, x_max: f64, interval: &NormalizedInterval) -> Vec<f64> {
        let (Some(&first), Some(&last)) = (xs.first(), xs.last()) else { return Vec::new() };
        let min = x_min.min(first);
        let max = x_max.max(last);
        let generator = TimeTickGenerator::new(*interval, self.options.start_of_week);
        let closest = self.closest_point_range.unwrap_or(0.0);
        TickSegmenter::for_groups(self)
            .ordinal(self.is_ordinal())
            .compute(xs, min, max, closest, &generator)
            .positions
    }
}

impl PixelTranslate for Axis {
    fn translate(&self, value: f64) -> f64 { self.scale.to_px(self.to_linear(value)) }
    fn untranslate(&self, px: f64) -> f64 { self.from_linear(self.scale.from_px(px)) }
}
