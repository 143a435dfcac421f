// File: crates/chart-axis/src/breaks.rs
// Summary: Axis breaks: excluded value ranges, merged break table and compensated translation.

use tracing::debug;

use crate::scale::AxisTransform;

/// Hard stop for repeating breaks expanded over a huge range.
const MAX_BREAK_OCCURRENCES: usize = 100_000;
/// Hard stop for pushing an extreme out of a break.
const MAX_CLAMP_STEPS: usize = 10_000;

/// A value range excluded from the rendered axis, optionally repeating every `repeat`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Break {
    pub from: f64,
    pub to: f64,
    /// Repeat period; `None` means the break occurs once.
    pub repeat: Option<f64>,
    pub inclusive: bool,
    /// Points inside the break stay visible.
    pub show_points: bool,
    /// Axis length kept for the break itself.
    pub break_size: f64,
}

impl Default for Break {
    fn default() -> Self {
        Self { from: 0.0, to: 0.0, repeat: None, inclusive: false, show_points: false, break_size: 0.0 }
    }
}

impl Break {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to, ..Self::default() }
    }

    pub fn repeating(mut self, period: f64) -> Self {
        self.repeat = Some(period);
        self
    }

    pub fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }

    pub fn with_show_points(mut self, show: bool) -> Self {
        self.show_points = show;
        self
    }

    pub fn with_break_size(mut self, size: f64) -> Self {
        self.break_size = size;
        self
    }

    pub fn len(&self) -> f64 { self.to - self.from }

    /// Zero-length or inverted breaks are no-ops.
    pub fn is_empty(&self) -> bool { !(self.len() > 0.0 && self.len().is_finite()) }

    fn period(&self) -> f64 {
        self.repeat.filter(|r| r.is_finite() && *r > 0.0).unwrap_or(f64::INFINITY)
    }
}

/// Whether `value` lies inside `brk` (`[from, to)`, or `[from, to]` when inclusive),
/// taking the repeat phase into account.
pub fn is_in_break(brk: &Break, value: f64) -> bool {
    break_phase(brk, value).is_some()
}

/// Offset of `value` from the start of the break occurrence containing it.
fn break_phase(brk: &Break, value: f64) -> Option<f64> {
    if brk.is_empty() || !value.is_finite() {
        return None;
    }
    // Infinite period: values before `from` get an infinite phase.
    let phase = (value - brk.from).rem_euclid(brk.period());
    let inside = if brk.inclusive { phase <= brk.len() } else { phase < brk.len() };
    inside.then_some(phase)
}

/// One merged, non-overlapping excluded interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakEntry {
    pub from: f64,
    pub to: f64,
    /// Axis length removed by this entry: `to - from - break_size`.
    pub len: f64,
}

/// Sorted, merged breaks intersected with the axis extremes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BreakTable {
    pub entries: Vec<BreakEntry>,
    /// Extremes after moving an extreme that fell inside a break to its edge.
    pub min: f64,
    pub max: f64,
    /// Visible axis length once every entry is removed.
    pub unit_length: f64,
}

#[derive(Clone, Copy, Debug)]
struct Boundary {
    value: f64,
    enter: bool,
    size: f64,
}

impl BreakTable {
    /// Expands every (repeating) break over `[min, max]` and merges the
    /// occurrences with one sweep over their enter/exit boundaries.
    pub fn build(breaks: &[Break], min: f64, max: f64) -> Self {
        let (mut min, mut max) = (min, max);
        for brk in breaks {
            if let Some(phase) = break_phase(brk, min) {
                min += brk.len() - phase;
            }
            if let Some(phase) = break_phase(brk, max) {
                max -= phase;
            }
        }

        let mut boundaries = Vec::new();
        for brk in breaks.iter().filter(|b| !b.is_empty()) {
            let length = brk.len();
            let repeat = brk.period();
            let mut start = if repeat.is_finite() {
                brk.from + (((min - brk.from - length) / repeat).floor() + 1.0) * repeat
            } else {
                brk.from
            };
            let mut n = 0;
            while start < max && n < MAX_BREAK_OCCURRENCES {
                let (from, to) = (start.max(min), (start + length).min(max));
                if to > min && from < to {
                    boundaries.push(Boundary { value: from, enter: true, size: 0.0 });
                    boundaries.push(Boundary { value: to, enter: false, size: brk.break_size });
                }
                if repeat.is_infinite() {
                    break;
                }
                start += repeat;
                n += 1;
            }
        }
        boundaries.sort_by(|a, b| a.value.total_cmp(&b.value).then(b.enter.cmp(&a.enter)));

        let mut entries = Vec::new();
        let mut depth = 0usize;
        let mut start = min;
        for b in &boundaries {
            if b.enter {
                if depth == 0 {
                    start = b.value;
                }
                depth += 1;
            } else {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let len = ((b.value - start) - b.size).max(0.0);
                    entries.push(BreakEntry { from: start, to: b.value, len });
                }
            }
        }

        let removed: f64 = entries.iter().map(|e| e.len).sum();
        Self { entries, min, max, unit_length: max - min - removed }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Removes the length of every break before `value`, and the covered part
    /// of a break containing it.
    pub fn to_compensated(&self, value: f64) -> f64 {
        let mut out = value;
        for e in &self.entries {
            if e.to <= value {
                out -= e.len;
            } else if e.from >= value {
                break;
            } else {
                out -= (value - e.from).min(e.len);
                break;
            }
        }
        out
    }

    /// Inverse of [`to_compensated`](Self::to_compensated) for values outside breaks.
    pub fn from_compensated(&self, value: f64) -> f64 {
        let mut out = value;
        for e in &self.entries {
            if e.from <= out {
                out += e.len;
            } else {
                break;
            }
        }
        out
    }
}

/// Break capability attached to an axis: definitions plus the table built for
/// the current extremes.
#[derive(Clone, Debug, Default)]
pub struct BreakBehavior {
    breaks: Vec<Break>,
    table: BreakTable,
}

impl BreakBehavior {
    pub fn new(breaks: Vec<Break>) -> Self {
        Self { breaks, table: BreakTable::default() }
    }

    pub fn definitions(&self) -> &[Break] { &self.breaks }

    pub fn table(&self) -> &BreakTable { &self.table }

    /// At least one well-formed break is defined.
    pub fn is_active(&self) -> bool { self.breaks.iter().any(|b| !b.is_empty()) }

    pub fn rebuild(&mut self, min: f64, max: f64) {
        self.table = BreakTable::build(&self.breaks, min, max);
        debug!(
            entries = self.table.entries.len(),
            min = self.table.min,
            max = self.table.max,
            unit_length = self.table.unit_length,
            "rebuilt break table"
        );
    }

    /// Whether `value` falls in any break. With `test_keep`, breaks that keep
    /// their points visible (`show_points`) do not count.
    pub fn is_in_any_break(&self, value: f64, test_keep: bool) -> bool {
        let mut inside = false;
        let mut keep = false;
        for brk in self.breaks.iter().filter(|b| is_in_break(b, value)) {
            inside = true;
            keep |= brk.show_points;
        }
        if test_keep { inside && !keep } else { inside }
    }

    /// Pushes an extreme lying inside a break outward (min down, max up) by
    /// `closest_point_range` steps until it is visible.
    pub fn clamp_extremes(&self, min: f64, max: f64, closest_point_range: f64) -> (f64, f64) {
        if !(closest_point_range > 0.0 && closest_point_range.is_finite()) {
            return (min, max);
        }
        let (mut min, mut max) = (min, max);
        let mut steps = 0;
        while self.is_in_any_break(min, false) && steps < MAX_CLAMP_STEPS {
            min -= closest_point_range;
            steps += 1;
        }
        steps = 0;
        while self.is_in_any_break(max, false) && steps < MAX_CLAMP_STEPS {
            max += closest_point_range;
            steps += 1;
        }
        (min, max)
    }
}

impl AxisTransform for BreakBehavior {
    fn to_linear(&self, value: f64) -> f64 { self.table.to_compensated(value) }
    fn from_linear(&self, linear: f64) -> f64 { self.table.from_compensated(linear) }
}
