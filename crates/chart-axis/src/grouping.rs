// File: crates/chart-axis/src/grouping.rs
// Summary: Data grouping: buckets raw points between group positions and reduces each bucket.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::approximation::{Aggregate, Approximation, Bucket, GroupValue};
use crate::axis::Axis;
use crate::ordinal::GroupingSignature;
use crate::series::Series;
use crate::time::{self, NormalizedInterval, TimeUnit, UnitSpec};
use crate::types::DEFAULT_GROUP_PIXEL_WIDTH;

/// Data grouping configuration shared by the series of one axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroupingOptions {
    pub enabled: bool,
    /// Group even when the points would fit without grouping.
    pub forced: bool,
    /// Approximation name; unknown names fall back to the series type default.
    pub approximation: Option<String>,
    /// Target pixel width of one group.
    pub group_pixel_width: f64,
    /// Allowed units and multiples, e.g. `[["week", [1]], ["month", [1, 3, 6]]]`.
    pub units: Vec<UnitSpec>,
    /// chrono format used by tooltips for each grouping unit.
    pub date_time_label_formats: BTreeMap<TimeUnit, String>,
    /// Place group coordinates mid-interval.
    pub smoothed: bool,
    /// Group the whole series instead of the cropped view.
    pub group_all: bool,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            forced: false,
            approximation: None,
            group_pixel_width: DEFAULT_GROUP_PIXEL_WIDTH,
            units: time::default_grouping_units(),
            date_time_label_formats: default_label_formats(),
            smoothed: false,
            group_all: false,
        }
    }
}

impl GroupingOptions {
    /// Label format for `unit`, falling back to the built-in one.
    pub fn label_format(&self, unit: TimeUnit) -> String {
        self.date_time_label_formats
            .get(&unit)
            .cloned()
            .unwrap_or_else(|| default_label_format(unit).to_string())
    }
}

fn default_label_format(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Millisecond => "%A, %b %e, %H:%M:%S%.3f",
        TimeUnit::Second => "%A, %b %e, %H:%M:%S",
        TimeUnit::Minute | TimeUnit::Hour => "%A, %b %e, %H:%M",
        TimeUnit::Day => "%A, %b %e, %Y",
        TimeUnit::Week => "Week from %A, %b %e, %Y",
        TimeUnit::Month => "%B %Y",
        TimeUnit::Year => "%Y",
    }
}

pub fn default_label_formats() -> BTreeMap<TimeUnit, String> {
    TimeUnit::ALL.into_iter().map(|u| (u, default_label_format(u).to_string())).collect()
}

/// Formats a millisecond timestamp (UTC); `None` for out-of-range times or a
/// malformed format string.
pub fn format_time(t: f64, format: &str) -> Option<String> {
    let dt = DateTime::<Utc>::from_timestamp_millis(t.floor() as i64)?;
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).ok()?;
    Some(out)
}

/// Per-group metadata for tooltips.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupMeta {
    /// Raw index of the first point in the group.
    pub first_index: usize,
    /// Group start boundary.
    pub x_start: f64,
    /// Next group boundary, or the last raw coordinate for the final group.
    pub x_end: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupInfo {
    /// Index into the raw data.
    pub start: usize,
    /// Raw points in the group.
    pub length: usize,
    pub options: GroupMeta,
}

/// Grouped coordinates and values, one entry per emitted group.
/// `None` in `grouped_y` is a rendered gap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedSeriesData {
    pub grouped_x: Vec<f64>,
    pub grouped_y: Vec<Option<GroupValue>>,
    pub group_map: Vec<GroupInfo>,
    /// Grouping interval, `None` when the data passed through ungrouped.
    pub interval: Option<NormalizedInterval>,
    /// Tooltip label format for `interval`.
    pub label_format: Option<String>,
}

impl GroupedSeriesData {
    pub fn len(&self) -> usize { self.grouped_x.len() }

    pub fn is_empty(&self) -> bool { self.grouped_x.is_empty() }

    pub fn is_grouped(&self) -> bool { self.interval.is_some() }

    pub fn signature(&self) -> GroupingSignature {
        self.interval.as_ref().map_or(GroupingSignature::Raw, GroupingSignature::from)
    }

    /// Tooltip header for group `i`, e.g. `Week from Monday, Jan  6, 2025`.
    pub fn group_label(&self, i: usize) -> Option<String> {
        let format = self.label_format.as_deref()?;
        let info = self.group_map.get(i)?;
        format_time(info.options.x_start, format)
    }
}

/// Assigns each raw point to the last group position at or before it and
/// reduces every group with `approximation`.
///
/// `channels` holds one value sequence per logical channel, parallel to `xs`.
/// Points before the first position are skipped, groups without raw points
/// emit nothing and groups of nulls emit a gap.
pub fn group(
    xs: &[f64],
    channels: &[&[Option<f64>]],
    group_positions: &[f64],
    approximation: &Approximation,
) -> GroupedSeriesData {
    let mut out = GroupedSeriesData::default();
    let Some(&first_position) = group_positions.first() else { return out };
    let n = xs.len();
    let mut buckets = vec![Bucket::new(); channels.len().max(1)];

    let mut i = xs.partition_point(|&x| x < first_position);
    let mut start = i;
    let mut pos = 0usize;
    loop {
        while i == n || group_positions.get(pos + 1).is_some_and(|&next| xs[i] >= next) {
            let length = i - start;
            if length > 0 {
                let x_end = group_positions.get(pos + 1).copied().unwrap_or(xs[i - 1]);
                let meta = GroupMeta { first_index: start, x_start: group_positions[pos], x_end };
                match approximation.apply(&buckets) {
                    Aggregate::Value(v) => emit(&mut out, meta, length, Some(v)),
                    Aggregate::Gap => emit(&mut out, meta, length, None),
                    Aggregate::NoData => {}
                }
            }
            buckets.iter_mut().for_each(Bucket::clear);
            start = i;
            pos += 1;
            if i == n {
                break;
            }
        }
        if i == n {
            break;
        }
        for (bucket, channel) in buckets.iter_mut().zip(channels) {
            bucket.push(channel.get(i).copied().flatten());
        }
        i += 1;
    }
    out
}

fn emit(out: &mut GroupedSeriesData, meta: GroupMeta, length: usize, value: Option<GroupValue>) {
    out.grouped_x.push(meta.x_start);
    out.grouped_y.push(value);
    out.group_map.push(GroupInfo { start: meta.first_index, length, options: meta });
}

/// Moves group coordinates to mid-interval, keeping the first and last inside `[x_min, x_max]`.
pub fn smooth(data: &mut GroupedSeriesData, x_min: f64, x_max: f64, interval: f64) {
    let len = data.grouped_x.len();
    if len == 0 {
        return;
    }
    data.grouped_x[len - 1] = data.grouped_x[len - 1].min(x_max);
    for x in data.grouped_x.iter_mut().take(len - 1).skip(1) {
        *x += interval / 2.0;
    }
    data.grouped_x[0] = data.grouped_x[0].max(x_min);
}

/// Each raw point as its own group.
pub fn ungrouped(xs: &[f64], channels: &[&[Option<f64>]], offset: usize) -> GroupedSeriesData {
    let mut out = GroupedSeriesData::default();
    for (i, &x) in xs.iter().enumerate() {
        let values: Vec<Option<f64>> = channels.iter().map(|c| c.get(i).copied().flatten()).collect();
        let y = match values.as_slice() {
            [single] => single.map(GroupValue::Single),
            _ if values.iter().all(Option::is_none) => None,
            _ => Some(GroupValue::Tuple(values)),
        };
        let next = xs.get(i + 1).copied().unwrap_or(x);
        let meta = GroupMeta { first_index: offset + i, x_start: x, x_end: next };
        out.grouped_x.push(x);
        out.grouped_y.push(y);
        out.group_map.push(GroupInfo { start: offset + i, length: 1, options: meta });
    }
    out
}

/// Whether `points` in the view need grouping on an axis `length_px` long.
pub fn should_group(options: &GroupingOptions, points: usize, length_px: f64) -> bool {
    if !options.enabled {
        return false;
    }
    let width = options.group_pixel_width.max(f64::MIN_POSITIVE);
    options.forced || points as f64 > length_px / width
}

/// Group interval for the view `[x_min, x_max]`, scaled by the group interval
/// factor and snapped to the allowed units.
pub fn group_interval(options: &GroupingOptions, x_min: f64, x_max: f64, length_px: f64, factor: f64) -> NormalizedInterval {
    let raw = options.group_pixel_width * (x_max - x_min) / length_px.max(1.0) * factor;
    time::normalize_time_tick_interval(raw, &options.units)
}

/// Groups one series for the current axis state, or passes it through when no
/// grouping is needed.
pub fn process_series(series: &Series, axis: &Axis, options: &GroupingOptions, factor: f64) -> GroupedSeriesData {
    let ext = axis.extremes();
    let range = if options.group_all { 0..series.len() } else { series.crop_range(ext.min, ext.max) };
    let offset = range.start;
    let xs = &series.xs()[range.clone()];
    let channels: Vec<&[Option<f64>]> = series.channels().iter().map(|c| &c[range.clone()]).collect();

    let points = series.points_in_view(ext.min, ext.max);
    if xs.is_empty() || !should_group(options, points, axis.length_px()) {
        trace!(series = %series.name, points, "series passes through ungrouped");
        return ungrouped(xs, &channels, offset);
    }

    let factor = if axis.is_ordinal() { factor } else { 1.0 };
    let interval = group_interval(options, ext.min, ext.max, axis.length_px(), factor);
    let positions = axis.group_positions(xs, ext.min, ext.max, &interval);
    let approximation = series
        .approximation
        .clone()
        .unwrap_or_else(|| Approximation::resolve(options.approximation.as_deref(), series.series_type));

    let mut data = group(xs, &channels, &positions, &approximation);
    for info in &mut data.group_map {
        info.start += offset;
        info.options.first_index += offset;
    }
    if options.smoothed {
        smooth(&mut data, ext.min, ext.max, interval.total_range());
    }
    data.label_format = Some(options.label_format(interval.unit));
    data.interval = Some(interval);
    debug!(
        series = %series.name,
        unit = %interval.unit,
        count = interval.count,
        raw = xs.len(),
        groups = data.len(),
        approximation = approximation.name(),
        "grouped series"
    );
    data
}
