// File: crates/chart-axis/src/ordinal.rs
// Summary: Ordinal index (value <-> evenly spaced linear space), extended tables and their cache.

use tracing::{debug, trace};

use crate::scale::{AxisTransform, Identity};
use crate::ticks::{TickSegmenter, TimeTickGenerator};
use crate::time::{NormalizedInterval, TimeUnit};
use crate::types::AxisExtremes;

/// Hard stop for synthetic overscroll positions.
const MAX_OVERSCROLL_POSITIONS: usize = 100_000;

/// Distinct data coordinates in ascending order plus the map from index space
/// to linear space: `linear = slope * index + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct OrdinalTable {
    pub positions: Vec<f64>,
    pub slope: f64,
    pub offset: f64,
}

impl Default for OrdinalTable {
    fn default() -> Self {
        Self { positions: Vec::new(), slope: 1.0, offset: 0.0 }
    }
}

impl OrdinalTable {
    /// Sorts and deduplicates `positions`; non-finite values are dropped.
    pub fn from_positions(mut positions: Vec<f64>) -> Self {
        positions.retain(|p| p.is_finite());
        positions.sort_by(f64::total_cmp);
        positions.dedup();
        Self { positions, ..Self::default() }
    }

    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn first(&self) -> Option<f64> { self.positions.first().copied() }

    pub fn last(&self) -> Option<f64> { self.positions.last().copied() }

    /// Fits slope and offset so the view window `[min, max]` keeps its width in linear space.
    pub fn fit_view(&mut self, min: f64, max: f64) {
        if self.len() < 2 {
            self.slope = 1.0;
            self.offset = 0.0;
            return;
        }
        let last = (self.len() - 1) as f64;
        let min_index = self.to_index(min).clamp(0.0, last);
        let max_index = self.to_index(max).clamp(0.0, last);
        let mut denom = max_index - min_index;
        if !(denom > 0.0 && denom.is_finite()) {
            denom = 1.0;
        }
        let slope = (max - min) / denom;
        self.slope = if slope > 0.0 && slope.is_finite() { slope } else { 1.0 };
        self.offset = min - min_index * self.slope;
    }

    /// Fractional index of `value`; outside the table the first or last pair is extrapolated.
    pub fn to_index(&self, value: f64) -> f64 {
        let len = self.len();
        if len < 2 {
            return 0.0;
        }
        match self.positions.binary_search_by(|p| p.total_cmp(&value)) {
            Ok(i) => i as f64,
            Err(i) => {
                let i = i.clamp(1, len - 1);
                let (a, b) = (self.positions[i - 1], self.positions[i]);
                (i - 1) as f64 + (value - a) / (b - a)
            }
        }
    }

    /// Coordinate at a fractional index, clamped to the first and last position.
    pub fn from_index(&self, index: f64) -> f64 {
        let Some(first) = self.first() else { return index };
        let last_index = self.len() - 1;
        if !(index > 0.0) {
            return first;
        }
        if index >= last_index as f64 {
            return self.positions[last_index];
        }
        let i = index.floor() as usize;
        let (a, b) = (self.positions[i], self.positions[i + 1]);
        a + (index - i as f64) * (b - a)
    }

    /// Like [`from_index`](Self::from_index), but continues the end pairs' spacing
    /// past either end instead of clamping.
    pub fn extrapolate_index(&self, index: f64) -> f64 {
        let len = self.len();
        if len < 2 {
            return self.from_index(index);
        }
        let last_index = (len - 1) as f64;
        if index < 0.0 {
            let (a, b) = (self.positions[0], self.positions[1]);
            a + index * (b - a)
        } else if index > last_index {
            let (a, b) = (self.positions[len - 2], self.positions[len - 1]);
            b + (index - last_index) * (b - a)
        } else {
            self.from_index(index)
        }
    }

    fn index_to_linear(&self, index: f64) -> f64 { self.slope * index + self.offset }

    fn linear_to_index(&self, linear: f64) -> f64 { (linear - self.offset) / self.slope }

    fn contains(&self, value: f64) -> bool {
        matches!((self.first(), self.last()), (Some(a), Some(b)) if value >= a && value <= b)
    }

    pub fn to_linear(&self, value: f64) -> f64 {
        if self.len() < 2 {
            return value;
        }
        self.index_to_linear(self.to_index(value))
    }

    pub fn from_linear(&self, linear: f64) -> f64 {
        if self.len() < 2 {
            return linear;
        }
        self.extrapolate_index(self.linear_to_index(linear))
    }

    /// [`to_linear`](Self::to_linear) that measures values outside the table in
    /// steps of `extended`, a table covering a wider range.
    pub fn to_linear_extended(&self, value: f64, extended: &OrdinalTable) -> f64 {
        if self.len() < 2 || extended.len() < 2 || self.contains(value) {
            return self.to_linear(value);
        }
        let (first, last) = (self.positions[0], self.positions[self.len() - 1]);
        let index = if value < first {
            extended.to_index(value) - extended.to_index(first)
        } else {
            (self.len() - 1) as f64 + extended.to_index(value) - extended.to_index(last)
        };
        self.index_to_linear(index)
    }

    /// Inverse of [`to_linear_extended`](Self::to_linear_extended).
    pub fn from_linear_extended(&self, linear: f64, extended: &OrdinalTable) -> f64 {
        if self.len() < 2 || extended.len() < 2 {
            return self.from_linear(linear);
        }
        let index = self.linear_to_index(linear);
        let last_index = (self.len() - 1) as f64;
        if index < 0.0 {
            extended.extrapolate_index(extended.to_index(self.positions[0]) + index)
        } else if index > last_index {
            extended.extrapolate_index(extended.to_index(self.positions[self.len() - 1]) + index - last_index)
        } else {
            self.from_index(index)
        }
    }
}

/// Ordinal settings taken from the axis options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrdinalOptions {
    /// Keep plain linear spacing when the view pads past the data.
    pub keep_padding: bool,
    /// Extra range past `data_max` filled with synthetic positions.
    pub overscroll: f64,
    pub start_of_week: u32,
}

/// Merges coordinate sets into one ascending, deduplicated sequence.
pub fn merge_positions<S: AsRef<[f64]>>(sets: &[S]) -> Vec<f64> {
    let mut merged: Vec<f64> = sets.iter().flat_map(|s| s.as_ref().iter().copied()).filter(|v| v.is_finite()).collect();
    merged.sort_by(f64::total_cmp);
    merged.dedup();
    merged
}

/// Smallest positive gap between consecutive ascending positions.
pub fn closest_distance(positions: &[f64]) -> Option<f64> {
    positions.windows(2).map(|w| w[1] - w[0]).filter(|d| *d > 0.0).min_by(f64::total_cmp)
}

/// Whether index-based spacing is worth it: gaps differ, or the view pads past
/// the data by more than one gap (unless `keep_padding`).
pub fn needs_ordinal(positions: &[f64], min: f64, max: f64, keep_padding: bool) -> bool {
    let len = positions.len();
    if len < 3 {
        return false;
    }
    let dist = positions[1] - positions[0];
    let eps = 1e-9 * dist.abs().max(1.0);
    if positions.windows(2).any(|w| ((w[1] - w[0]) - dist).abs() > eps) {
        return true;
    }
    !keep_padding && (positions[0] - min > dist || max - positions[len - 1] > dist)
}

/// Appends positions every `closest` after the last one, up to `data_max + overscroll`.
pub fn overscroll_positions(positions: &mut Vec<f64>, data_max: f64, overscroll: f64, closest: f64) {
    if !(overscroll > 0.0 && closest > 0.0 && overscroll.is_finite()) {
        return;
    }
    let Some(mut p) = positions.last().copied() else { return };
    let end = data_max + overscroll;
    let mut n = 0;
    while p + closest <= end && n < MAX_OVERSCROLL_POSITIONS {
        p += closest;
        positions.push(p);
        n += 1;
    }
}

/// Builds the ordinal table for the view, or an empty table when the axis
/// should behave linearly.
pub fn build(coordinates: &[f64], extremes: &AxisExtremes, options: &OrdinalOptions) -> OrdinalTable {
    let mut positions = merge_positions(&[coordinates]);
    if !needs_ordinal(&positions, extremes.min, extremes.max, options.keep_padding) {
        return OrdinalTable::default();
    }
    if let Some(closest) = closest_distance(&positions) {
        overscroll_positions(&mut positions, extremes.data_max, options.overscroll, closest);
    }
    let mut table = OrdinalTable::from_positions(positions);
    table.fit_view(extremes.min, extremes.max);
    table
}

/// Which position set a table was built from: raw data, or group starts of one grouping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GroupingSignature {
    #[default]
    Raw,
    Grouped { unit: TimeUnit, count: f64 },
}

impl GroupingSignature {
    /// Spacing between consecutive group starts; `None` for raw data.
    pub fn total_range(&self) -> Option<f64> {
        match *self {
            GroupingSignature::Raw => None,
            GroupingSignature::Grouped { unit, count } => Some(unit.range_ms() * count),
        }
    }
}

impl From<&NormalizedInterval> for GroupingSignature {
    fn from(ni: &NormalizedInterval) -> Self {
        GroupingSignature::Grouped { unit: ni.unit, count: ni.count }
    }
}

/// Inputs for an extended table covering all data instead of the view.
#[derive(Clone, Copy, Debug)]
pub struct ExtendedPositionsRequest<'a> {
    pub coordinates: &'a [f64],
    pub signature: GroupingSignature,
    /// Overscroll past the last coordinate.
    pub extra_range: f64,
    pub closest_distance: f64,
    pub start_of_week: u32,
}

/// Positions of the whole data range for `request.signature`, plus the overscroll tail.
pub fn extended_table(request: &ExtendedPositionsRequest<'_>) -> OrdinalTable {
    let coords = merge_positions(&[request.coordinates]);
    let (Some(&first), Some(&last)) = (coords.first(), coords.last()) else {
        return OrdinalTable::default();
    };
    let mut positions = match request.signature {
        GroupingSignature::Raw => coords.clone(),
        GroupingSignature::Grouped { unit, count } => {
            let generator = TimeTickGenerator::new(NormalizedInterval::new(unit, count), request.start_of_week);
            TickSegmenter::for_groups(&Identity)
                .ordinal(true)
                .compute(&coords, first, last, request.closest_distance, &generator)
                .positions
        }
    };
    let spacing = closest_distance(&positions).unwrap_or(request.closest_distance);
    overscroll_positions(&mut positions, last, request.extra_range, spacing);
    OrdinalTable::from_positions(positions)
}

/// Caches derived from the raw data of one axis, dropped when the data version changes.
#[derive(Clone, Debug, Default)]
pub struct OrdinalCache {
    data_version: Option<u64>,
    extended: Vec<(GroupingSignature, OrdinalTable)>,
    group_interval_factor: Option<f64>,
}

impl OrdinalCache {
    /// Drops extended tables built from older data.
    pub fn sync(&mut self, data_version: u64) {
        if self.data_version != Some(data_version) {
            if !self.extended.is_empty() {
                trace!(old = ?self.data_version, new = data_version, "invalidated extended ordinal tables");
            }
            self.extended.clear();
            self.data_version = Some(data_version);
        }
    }

    pub fn extended(&self, signature: GroupingSignature) -> Option<&OrdinalTable> {
        self.extended.iter().find(|(s, _)| *s == signature).map(|(_, t)| t)
    }

    fn insert_extended(&mut self, signature: GroupingSignature, table: OrdinalTable) {
        self.extended.retain(|(s, _)| *s != signature);
        self.extended.push((signature, table));
    }

    pub fn group_interval_factor(&self) -> Option<f64> { self.group_interval_factor }

    pub fn reset_group_interval_factor(&mut self) { self.group_interval_factor = None; }
}

/// Ratio between a series' typical spacing and its average spacing over
/// `[x_min, x_max]`: `len * median / (x_max - x_min)`, extremes clamped to the data.
pub fn estimate_group_interval_factor(x_min: f64, x_max: f64, xs: &[f64]) -> f64 {
    let len = xs.len();
    if len < 2 {
        return 1.0;
    }
    let mut distances: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    distances.sort_by(f64::total_cmp);
    let median = distances[(len / 2).min(distances.len() - 1)];
    let x_min = x_min.max(xs[0]);
    let x_max = x_max.min(xs[len - 1]);
    let span = x_max - x_min;
    let factor = len as f64 * median / span;
    if factor > 0.0 && factor.is_finite() { factor } else { 1.0 }
}

/// Ordinal capability of an axis: merged coordinates, the current table and its caches.
#[derive(Clone, Debug, Default)]
pub struct OrdinalBehavior {
    options: OrdinalOptions,
    coordinates: Vec<f64>,
    closest: Option<f64>,
    /// Table built from the raw coordinates, restored when grouping is undone.
    raw_table: OrdinalTable,
    table: OrdinalTable,
    signature: GroupingSignature,
    cache: OrdinalCache,
}

impl OrdinalBehavior {
    pub fn new(options: OrdinalOptions) -> Self {
        Self { options, ..Self::default() }
    }

    pub fn options(&self) -> &OrdinalOptions { &self.options }

    pub fn table(&self) -> &OrdinalTable { &self.table }

    /// The axis currently spaces points by index.
    pub fn is_active(&self) -> bool { self.table.len() >= 2 }

    pub fn signature(&self) -> GroupingSignature { self.signature }

    pub fn closest_distance(&self) -> Option<f64> { self.closest }

    pub fn cache(&self) -> &OrdinalCache { &self.cache }

    /// Rebuilds the table from raw coordinate sets for new extremes.
    pub fn rebuild<S: AsRef<[f64]>>(&mut self, coordinate_sets: &[S], extremes: &AxisExtremes, data_version: u64) {
        self.cache.sync(data_version);
        self.cache.reset_group_interval_factor();
        self.coordinates = merge_positions(coordinate_sets);
        self.closest = closest_distance(&self.coordinates);
        self.raw_table = build(&self.coordinates, extremes, &self.options);
        self.table = self.raw_table.clone();
        self.signature = GroupingSignature::Raw;
        debug!(
            positions = self.coordinates.len(),
            active = self.is_active(),
            slope = self.table.slope,
            "rebuilt ordinal index"
        );
    }

    /// Re-indexes the axis on grouped coordinates after data grouping ran.
    /// Returns false, leaving the raw index in place, when the grouped
    /// positions would space linearly.
    pub fn apply_grouping(&mut self, grouped: &[f64], signature: GroupingSignature, extremes: &AxisExtremes) -> bool {
        if self.raw_table.len() < 2 {
            return false;
        }
        let table = build(grouped, extremes, &self.options);
        if table.len() < 2 {
            return false;
        }
        self.table = table;
        self.signature = signature;
        trace!(positions = self.table.len(), ?signature, "ordinal index follows grouped positions");
        true
    }

    /// Restores the index built from raw coordinates.
    pub fn reset_grouping(&mut self) {
        if self.signature != GroupingSignature::Raw {
            self.table = self.raw_table.clone();
            self.signature = GroupingSignature::Raw;
            trace!(positions = self.table.len(), "ordinal index back on raw positions");
        }
    }

    /// Extended table for the current grouping signature, built on first use.
    pub fn extended_table(&mut self) -> Option<&OrdinalTable> {
        if !self.is_active() {
            return None;
        }
        let signature = self.signature;
        if self.cache.extended(signature).is_none() {
            let request = ExtendedPositionsRequest {
                coordinates: &self.coordinates,
                signature,
                extra_range: self.options.overscroll,
                closest_distance: self.closest.unwrap_or(1.0),
                start_of_week: self.options.start_of_week,
            };
            let table = extended_table(&request);
            debug!(?signature, positions = table.len(), "built extended ordinal table");
            self.cache.insert_extended(signature, table);
        }
        self.cache.extended(signature)
    }

    /// Extended table for the current signature if one is cached.
    pub fn cached_extended_table(&self) -> Option<&OrdinalTable> { self.cache.extended(self.signature) }

    /// Group interval factor for `xs` over `[x_min, x_max]`, computed once per rebuild.
    pub fn group_interval_factor(&mut self, x_min: f64, x_max: f64, xs: &[f64]) -> f64 {
        if let Some(factor) = self.cache.group_interval_factor() {
            return factor;
        }
        let factor = estimate_group_interval_factor(x_min, x_max, xs);
        trace!(factor, "estimated group interval factor");
        self.cache.group_interval_factor = Some(factor);
        factor
    }

    /// Converts a tick interval measured in linear space back to real units.
    pub fn post_process_tick_interval(&self, interval: f64, closest_point_range: f64) -> f64 {
        let slope = self.table.slope;
        if self.is_active() && slope > 0.0 && closest_point_range > 0.0 {
            interval / (slope / closest_point_range)
        } else {
            interval
        }
    }
}

impl AxisTransform for OrdinalBehavior {
    fn to_linear(&self, value: f64) -> f64 {
        match self.cached_extended_table() {
            Some(ext) => self.table.to_linear_extended(value, ext),
            None => self.table.to_linear(value),
        }
    }

    fn from_linear(&self, linear: f64) -> f64 {
        match self.cached_extended_table() {
            Some(ext) => self.table.from_linear_extended(linear, ext),
            None => self.table.from_linear(linear),
        }
    }
}
