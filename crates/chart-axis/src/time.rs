// File: crates/chart-axis/src/time.rs
// Summary: Time units, tick interval normalization and calendar-aligned time ticks (UTC).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::error::AxisError;
use crate::ticks::{HigherRanks, TickInfo, TickSet};
use crate::types::correct_float;

const MS_PER_DAY: f64 = 86_400_000.0;
/// Upper bound on ticks produced by one call; protects against degenerate ranges.
const MAX_TIME_TICKS: usize = 100_000;
/// Rank marking is skipped for very long tick arrays.
const MAX_RANKED_TICKS: usize = 10_000;

/// Calendar unit used for time ticks and data grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 8] = [
        TimeUnit::Millisecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Year,
    ];

    /// Nominal length of one unit in milliseconds (months are 28 days, years 364).
    pub const fn range_ms(self) -> f64 {
        match self {
            TimeUnit::Millisecond => 1.0,
            TimeUnit::Second => 1_000.0,
            TimeUnit::Minute => 60_000.0,
            TimeUnit::Hour => 3_600_000.0,
            TimeUnit::Day => MS_PER_DAY,
            TimeUnit::Week => 7.0 * MS_PER_DAY,
            TimeUnit::Month => 28.0 * MS_PER_DAY,
            TimeUnit::Year => 364.0 * MS_PER_DAY,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "millisecond",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeUnit {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TimeUnit::ALL
            .into_iter()
            .find(|u| u.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AxisError::UnknownTimeUnit(wanted.to_string()))
    }
}

/// One `[unitName, allowedMultiples]` entry. `None` multiples allow any multiple.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSpec(pub TimeUnit, pub Option<Vec<f64>>);

impl UnitSpec {
    pub fn new(unit: TimeUnit, multiples: &[f64]) -> Self {
        Self(unit, Some(multiples.to_vec()))
    }

    pub fn any(unit: TimeUnit) -> Self {
        Self(unit, None)
    }

    pub fn unit(&self) -> TimeUnit { self.0 }

    pub fn multiples(&self) -> Option<&[f64]> { self.1.as_deref() }

    fn largest_multiple(&self) -> f64 {
        self.multiples().and_then(|m| m.last().copied()).unwrap_or(1.0)
    }
}

impl FromStr for UnitSpec {
    type Err = AxisError;

    /// Parses `unit` or `unit:m1,m2,...`, e.g. `hour:1,2,6`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, multiples) = match s.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (s, None),
        };
        let unit = name.parse::<TimeUnit>()?;
        let multiples = multiples.map(|rest| {
            rest.split(',')
                .filter_map(|m| m.trim().parse::<f64>().ok())
                .filter(|m| *m > 0.0)
                .collect::<Vec<_>>()
        });
        Ok(match multiples {
            Some(m) if !m.is_empty() => Self(unit, Some(m)),
            _ => Self(unit, None),
        })
    }
}

/// Parses a `;`-separated unit list such as `day:1;week:1;month:1,3,6;year`.
pub fn parse_units(s: &str) -> Result<Vec<UnitSpec>, AxisError> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Units available for data grouping.
pub fn default_grouping_units() -> Vec<UnitSpec> {
    vec![
        UnitSpec::new(TimeUnit::Millisecond, &[1.0, 2.0, 5.0, 10.0, 20.0, 25.0, 50.0, 100.0, 200.0, 500.0]),
        UnitSpec::new(TimeUnit::Second, &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0]),
        UnitSpec::new(TimeUnit::Minute, &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0]),
        UnitSpec::new(TimeUnit::Hour, &[1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0]),
        UnitSpec::new(TimeUnit::Day, &[1.0]),
        UnitSpec::new(TimeUnit::Week, &[1.0]),
        UnitSpec::new(TimeUnit::Month, &[1.0, 3.0, 6.0]),
        UnitSpec::any(TimeUnit::Year),
    ]
}

/// Units available for axis tick marks.
pub fn default_tick_units() -> Vec<UnitSpec> {
    vec![
        UnitSpec::new(TimeUnit::Millisecond, &[1.0, 2.0, 5.0, 10.0, 20.0, 25.0, 50.0, 100.0, 200.0, 500.0]),
        UnitSpec::new(TimeUnit::Second, &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0]),
        UnitSpec::new(TimeUnit::Minute, &[1.0, 2.0, 5.0, 10.0, 15.0, 30.0]),
        UnitSpec::new(TimeUnit::Hour, &[1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0]),
        UnitSpec::new(TimeUnit::Day, &[1.0, 2.0]),
        UnitSpec::new(TimeUnit::Week, &[1.0, 2.0]),
        UnitSpec::new(TimeUnit::Month, &[1.0, 2.0, 3.0, 4.0, 6.0]),
        UnitSpec::any(TimeUnit::Year),
    ]
}

/// A tick interval expressed as `count` × `unit`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedInterval {
    pub unit: TimeUnit,
    pub unit_range: f64,
    pub count: f64,
}

impl NormalizedInterval {
    pub fn new(unit: TimeUnit, count: f64) -> Self {
        Self { unit, unit_range: unit.range_ms(), count }
    }

    /// Nominal length of one interval in milliseconds.
    pub fn total_range(&self) -> f64 { self.unit_range * self.count }
}

/// Power of ten at or below `n`.
pub fn magnitude(n: f64) -> f64 {
    10f64.powf(n.log10().floor())
}

/// Rounds `interval` (scaled by `magnitude`) to the nearest allowed multiple.
pub fn normalize_tick_interval(interval: f64, multiples: Option<&[f64]>, magnitude: f64) -> f64 {
    const DEFAULT_MULTIPLES: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];
    let multiples = match multiples {
        Some(m) if !m.is_empty() => m,
        _ => &DEFAULT_MULTIPLES[..],
    };
    let normalized = interval / magnitude;
    let mut picked = multiples[0];
    for (i, &m) in multiples.iter().enumerate() {
        picked = m;
        let next = multiples.get(i + 1).copied().unwrap_or(m);
        if normalized <= (m + next) / 2.0 {
            break;
        }
    }
    correct_float(picked * magnitude)
}

/// Picks the unit and count closest to `tick_interval` (ms) from `units`.
/// An empty unit list falls back to the default tick units.
pub fn normalize_time_tick_interval(tick_interval: f64, units: &[UnitSpec]) -> NormalizedInterval {
    let fallback;
    let units = if units.is_empty() {
        fallback = default_tick_units();
        &fallback[..]
    } else {
        units
    };

    let mut idx = units.len() - 1;
    for i in 0..units.len() {
        idx = i;
        if let Some(next) = units.get(i + 1) {
            let less_than =
                (units[i].unit().range_ms() * units[i].largest_multiple() + next.unit().range_ms()) / 2.0;
            if tick_interval <= less_than {
                break;
            }
        }
    }

    let spec = &units[idx];
    let unit = spec.unit();
    let range = unit.range_ms();
    let short_years = [1.0, 2.0, 5.0];
    let multiples = if unit == TimeUnit::Year && tick_interval < 5.0 * range {
        Some(&short_years[..])
    } else {
        spec.multiples()
    };
    let mag = if unit == TimeUnit::Year { magnitude(tick_interval / range).max(1.0) } else { 1.0 };
    let count = normalize_tick_interval(tick_interval / range, multiples, mag).max(1.0);

    NormalizedInterval { unit, unit_range: range, count }
}

/// Calendar date of a millisecond timestamp (UTC).
pub fn utc_date(t: f64) -> Option<NaiveDate> {
    if !t.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(t.floor() as i64).map(|dt| dt.date_naive())
}

/// `true` when `t` is exactly UTC midnight.
pub fn is_utc_midnight(t: f64) -> bool {
    t.is_finite() && t.rem_euclid(MS_PER_DAY) == 0.0
}

fn to_ms(date: NaiveDate, hour: u32, minute: u32, second: u32, milli: u32) -> Option<f64> {
    date.and_hms_milli_opt(hour, minute, second, milli)
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}

fn month_start(year: i64, month0: i64) -> Option<f64> {
    let y = year + month0.div_euclid(12);
    let m = month0.rem_euclid(12) as u32 + 1;
    let date = NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, m, 1)?;
    to_ms(date, 0, 0, 0, 0)
}

/// Start of the interval containing `min`, aligned to the unit boundary.
fn aligned_start(ni: &NormalizedInterval, min: f64, start_of_week: u32) -> Option<(f64, i64, i64)> {
    let dt = DateTime::<Utc>::from_timestamp_millis(min.floor() as i64)?;
    let unit = ni.unit;
    let c = (ni.count.round() as i64).max(1);

    let mut milli = dt.timestamp_subsec_millis() as i64;
    let mut second = dt.second() as i64;
    let mut minute = dt.minute() as i64;
    let mut hour = dt.hour() as i64;
    let mut day = dt.day() as i64;
    let mut month0 = dt.month0() as i64;
    let mut year = dt.year() as i64;

    milli = if unit >= TimeUnit::Second { 0 } else { c * milli.div_euclid(c) };
    if unit >= TimeUnit::Second {
        second = if unit >= TimeUnit::Minute { 0 } else { c * second.div_euclid(c) };
    }
    if unit >= TimeUnit::Minute {
        minute = if unit >= TimeUnit::Hour { 0 } else { c * minute.div_euclid(c) };
    }
    if unit >= TimeUnit::Hour {
        hour = if unit >= TimeUnit::Day { 0 } else { c * hour.div_euclid(c) };
    }
    if unit >= TimeUnit::Day {
        day = if unit >= TimeUnit::Month { 1 } else { (c * day.div_euclid(c)).max(1) };
    }
    if unit >= TimeUnit::Month {
        month0 = if unit >= TimeUnit::Year { 0 } else { c * month0.div_euclid(c) };
    }
    if unit >= TimeUnit::Year {
        year -= year.rem_euclid(c);
    }

    let mut date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month0 as u32 + 1, day as u32)?;
    if unit == TimeUnit::Week {
        let weekday = date.weekday().num_days_from_sunday() as i64;
        let start = start_of_week as i64 % 7;
        let shift = start - weekday - if weekday < start { 7 } else { 0 };
        date = date.checked_add_signed(Duration::days(shift))?;
    }
    let start = to_ms(date, hour as u32, minute as u32, second as u32, milli as u32)?;
    Some((start, year, month0))
}

/// Generates calendar-aligned ticks covering `[min, max]`.
///
/// The first tick is `min` aligned down to the unit boundary; the last tick is the
/// first one at or past `max`. For intervals of an hour or less, ticks at UTC
/// midnight carry a `day` higher rank. `start_of_week` counts from Sunday = 0.
pub fn time_ticks(ni: &NormalizedInterval, min: f64, max: f64, start_of_week: u32) -> TickSet {
    let mut info = TickInfo::for_interval(ni);
    let mut positions = Vec::new();
    let step = ni.unit_range * ni.count;
    if !min.is_finite() || !max.is_finite() || !(step > 0.0) {
        return TickSet { positions, info };
    }

    let c = (ni.count.round() as i64).max(1);
    let (start, year, month0) = aligned_start(ni, min, start_of_week)
        .unwrap_or_else(|| ((min / step).floor() * step, 0, 0));

    let mut i = 1i64;
    let mut t = start;
    while t < max && positions.len() < MAX_TIME_TICKS {
        positions.push(t);
        let next = match ni.unit {
            TimeUnit::Year => month_start(year + i * c, 0),
            TimeUnit::Month => month_start(year, month0 + i * c),
            _ => Some(start + step * i as f64),
        };
        match next {
            Some(n) if n > t => t = n,
            _ => break,
        }
        i += 1;
    }
    if positions.last() != Some(&t) {
        positions.push(t);
    }

    if ni.unit_range <= TimeUnit::Hour.range_ms() && positions.len() < MAX_RANKED_TICKS {
        let mut ranks = HigherRanks::default();
        for &p in positions.iter().filter(|p| is_utc_midnight(**p)) {
            ranks.insert(p, TimeUnit::Day);
        }
        info.higher_ranks = ranks;
    }
    TickSet { positions, info }
}
