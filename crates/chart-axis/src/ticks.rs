// File: crates/chart-axis/src/ticks.rs
// Summary: Tick sets, tick generators and the gap-aware tick segmenter (segment, rank, thin).

use tracing::{debug, trace};

use crate::breaks::BreakBehavior;
use crate::scale::PixelTranslate;
use crate::time::{self, NormalizedInterval, TimeUnit};
use crate::types::{correct_float, MEDIAN_DISCARD_FACTOR, SEGMENT_GAP_FACTOR, THINNING_FACTOR};

/// Ticks that mark a larger time boundary, kept sorted by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HigherRanks {
    entries: Vec<(f64, TimeUnit)>,
}

impl HigherRanks {
    pub fn insert(&mut self, position: f64, rank: TimeUnit) {
        match self.entries.binary_search_by(|(p, _)| p.total_cmp(&position)) {
            Ok(i) => self.entries[i].1 = rank,
            Err(i) => self.entries.insert(i, (position, rank)),
        }
    }

    pub fn get(&self, position: f64) -> Option<TimeUnit> {
        self.entries
            .binary_search_by(|(p, _)| p.total_cmp(&position))
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn contains(&self, position: f64) -> bool { self.get(position).is_some() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (f64, TimeUnit)> + '_ {
        self.entries.iter().copied()
    }

    /// Drop ranks whose position is no longer among `positions` (ascending).
    pub fn retain_positions(&mut self, positions: &[f64]) {
        self.entries
            .retain(|(p, _)| positions.binary_search_by(|q| q.total_cmp(p)).is_ok());
    }
}

/// Metadata shared by all ticks of one set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickInfo {
    /// Calendar unit for time ticks, `None` for plain numeric ticks.
    pub unit: Option<TimeUnit>,
    pub unit_range: f64,
    pub count: f64,
    pub total_range: f64,
    pub higher_ranks: HigherRanks,
    /// Index of the first tick of every data segment.
    pub segment_starts: Vec<usize>,
}

impl TickInfo {
    pub fn for_interval(ni: &NormalizedInterval) -> Self {
        Self {
            unit: Some(ni.unit),
            unit_range: ni.unit_range,
            count: ni.count,
            total_range: ni.total_range(),
            ..Self::default()
        }
    }

    pub fn linear(interval: f64) -> Self {
        Self { unit: None, unit_range: interval, count: 1.0, total_range: interval, ..Self::default() }
    }
}

/// Ordered, deduplicated tick positions plus their shared info.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSet {
    pub positions: Vec<f64>,
    pub info: TickInfo,
}

impl TickSet {
    pub fn len(&self) -> usize { self.positions.len() }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    pub fn rank_of(&self, position: f64) -> Option<TimeUnit> { self.info.higher_ranks.get(position) }

    /// Keeps positions matching `keep`, dropping their ranks and re-pointing segment starts.
    pub fn retain<F: FnMut(f64) -> bool>(&mut self, mut keep: F) {
        let starts: Vec<f64> =
            self.info.segment_starts.iter().filter_map(|&i| self.positions.get(i).copied()).collect();
        self.positions.retain(|&p| keep(p));
        self.info.higher_ranks.retain_positions(&self.positions);
        let mut reindexed: Vec<usize> = starts
            .iter()
            .map(|&s| self.positions.partition_point(|&p| p < s))
            .filter(|&i| i < self.positions.len())
            .collect();
        reindexed.dedup();
        self.info.segment_starts = reindexed;
    }
}

/// Evenly spaced tick generation over one contiguous range.
pub trait TickGenerator {
    fn generate(&self, min: f64, max: f64) -> TickSet;
}

/// Calendar-aligned ticks for datetime axes.
#[derive(Clone, Copy, Debug)]
pub struct TimeTickGenerator {
    pub interval: NormalizedInterval,
    pub start_of_week: u32,
}

impl TimeTickGenerator {
    pub fn new(interval: NormalizedInterval, start_of_week: u32) -> Self {
        Self { interval, start_of_week }
    }
}

impl TickGenerator for TimeTickGenerator {
    fn generate(&self, min: f64, max: f64) -> TickSet {
        time::time_ticks(&self.interval, min, max, self.start_of_week)
    }
}

/// Multiples of a fixed step inside `[min, max]`.
#[derive(Clone, Copy, Debug)]
pub struct LinearTickGenerator {
    pub interval: f64,
}

impl LinearTickGenerator {
    pub fn new(interval: f64) -> Self {
        Self { interval }
    }

    /// Nice 1/2/2.5/5/10 step giving roughly one tick per `tick_pixel_interval`.
    pub fn for_span(span: f64, length_px: f64, tick_pixel_interval: f64) -> Self {
        let ticks = (length_px / tick_pixel_interval.max(1.0)).max(1.0);
        let raw = span / ticks;
        if !(raw.is_finite() && raw > 0.0) {
            return Self::new(1.0);
        }
        let mag = time::magnitude(raw);
        Self::new(time::normalize_tick_interval(raw, None, mag))
    }
}

impl TickGenerator for LinearTickGenerator {
    fn generate(&self, min: f64, max: f64) -> TickSet {
        let mut positions = Vec::new();
        let step = self.interval;
        if min.is_finite() && max.is_finite() && step > 0.0 {
            let first = (min / step).ceil();
            let last = (max / step).floor();
            let mut k = first;
            while k <= last && positions.len() < 100_000 {
                positions.push(correct_float(k * step));
                k += 1.0;
            }
        }
        TickSet { positions, info: TickInfo::linear(step) }
    }
}

/// Splits candidate positions at data gaps, generates ticks per segment, then
/// marks higher-ranked ticks and thins crowded ones in pixel space.
///
/// In tick mode the result is clipped to `[min, max + closest_distance]` and
/// ticks inside breaks are dropped. In grouping mode positions are returned
/// untouched so every raw point falls into a group.
pub struct TickSegmenter<'a, P: PixelTranslate + ?Sized> {
    pixels: &'a P,
    breaks: Option<&'a BreakBehavior>,
    ordinal: bool,
    find_higher_ranks: bool,
    tick_pixel_interval: Option<f64>,
}

impl<'a, P: PixelTranslate + ?Sized> TickSegmenter<'a, P> {
    /// Segmenter producing axis ticks (rank marking and thinning enabled).
    pub fn for_ticks(pixels: &'a P, tick_pixel_interval: f64) -> Self {
        Self {
            pixels,
            breaks: None,
            ordinal: false,
            find_higher_ranks: true,
            tick_pixel_interval: Some(tick_pixel_interval),
        }
    }

    /// Segmenter producing group boundaries (no ranks, no thinning, no clipping).
    pub fn for_groups(pixels: &'a P) -> Self {
        Self { pixels, breaks: None, ordinal: false, find_higher_ranks: false, tick_pixel_interval: None }
    }

    pub fn ordinal(mut self, ordinal: bool) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn breaks(mut self, breaks: Option<&'a BreakBehavior>) -> Self {
        self.breaks = breaks.filter(|b| b.is_active());
        self
    }

    pub fn compute<G: TickGenerator + ?Sized>(
        &self,
        candidates: &[f64],
        min: f64,
        max: f64,
        closest_distance: f64,
        generator: &G,
    ) -> TickSet {
        if (!self.ordinal && self.breaks.is_none()) || candidates.len() < 3 || !min.is_finite() {
            let ticks = generator.generate(min, max);
            return self.finish(ticks, min, max, closest_distance);
        }

        let Some(mut ticks) = self.segment(candidates, min, max, closest_distance, generator) else {
            return self.finish(generator.generate(min, max), min, max, closest_distance);
        };

        if self.find_higher_ranks && ticks.info.unit.is_some() && ticks.info.unit_range < TimeUnit::Day.range_ms() {
            ticks.info.higher_ranks = rank_day_crossings(&ticks.positions);
        }
        if self.find_higher_ranks {
            if let Some(tpi) = self.tick_pixel_interval {
                self.thin(&mut ticks, max, tpi);
            }
        }
        self.finish(ticks, min, max, closest_distance)
    }

    fn segment<G: TickGenerator + ?Sized>(
        &self,
        candidates: &[f64],
        min: f64,
        max: f64,
        closest_distance: f64,
        generator: &G,
    ) -> Option<TickSet> {
        let len = candidates.len();
        let mut positions: Vec<f64> = Vec::new();
        let mut segment_starts = Vec::new();
        let mut ranks = HigherRanks::default();
        let mut info: Option<TickInfo> = None;
        let mut last_group = f64::MIN;
        let mut start = 0usize;

        for end in 0..len {
            let outside_max = end > 0 && candidates[end - 1] > max;
            if candidates[end] < min {
                start = end;
            }
            let gap_follows = end + 1 < len
                && candidates[end + 1] - candidates[end] > closest_distance * SEGMENT_GAP_FACTOR;
            if end == len - 1 || gap_follows || outside_max {
                if candidates[end] > last_group {
                    let segment = generator.generate(candidates[start], candidates[end]);
                    let fresh: Vec<f64> =
                        segment.positions.iter().copied().skip_while(|&p| p <= last_group).collect();
                    if let Some(&last) = fresh.last() {
                        last_group = last;
                    }
                    for &p in &fresh {
                        if let Some(rank) = segment.info.higher_ranks.get(p) {
                            ranks.insert(p, rank);
                        }
                    }
                    segment_starts.push(positions.len());
                    positions.extend(fresh);
                    info = Some(segment.info);
                }
                start = end + 1;
            }
            if outside_max {
                break;
            }
        }

        let mut info = info?;
        trace!(segments = segment_starts.len(), ticks = positions.len(), "segmented tick candidates");
        info.higher_ranks = ranks;
        info.segment_starts = segment_starts;
        Some(TickSet { positions, info })
    }

    fn thin(&self, ticks: &mut TickSet, max: f64, tick_pixel_interval: f64) {
        let len = ticks.positions.len();
        if len < 2 {
            return;
        }
        let translated: Vec<f64> = ticks.positions.iter().map(|&p| self.pixels.translate(p)).collect();

        let mut distances: Vec<f64> = translated.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        distances.sort_by(f64::total_cmp);
        let median = distances
            .get(distances.len() / 2)
            .copied()
            .filter(|&m| m >= tick_pixel_interval * MEDIAN_DISCARD_FACTOR);
        let threshold = match median {
            Some(m) => (tick_pixel_interval * THINNING_FACTOR).max(m * THINNING_FACTOR),
            None => tick_pixel_interval * THINNING_FACTOR,
        };

        let ranks = &ticks.info.higher_ranks;
        let mut keep = vec![true; len];
        let mut right: Option<usize> = None;
        let mut i = if ticks.positions[len - 1] > max { len - 1 } else { len };
        while i > 0 {
            i -= 1;
            match right {
                Some(r) if (translated[r] - translated[i]).abs() < threshold => {
                    if ranks.contains(ticks.positions[i]) && !ranks.contains(ticks.positions[r]) {
                        keep[r] = false;
                        right = Some(i);
                    } else {
                        keep[i] = false;
                    }
                }
                _ => right = Some(i),
            }
        }

        let mut k = 0;
        ticks.retain(|_| {
            k += 1;
            keep[k - 1]
        });
        debug!(before = len, after = ticks.positions.len(), threshold, "thinned crowded ticks");
    }

    fn finish(&self, mut ticks: TickSet, min: f64, max: f64, closest_distance: f64) -> TickSet {
        if !self.find_higher_ranks {
            return ticks;
        }
        let upper = max + closest_distance.max(0.0);
        ticks.retain(|p| p >= min && p <= upper);
        if let Some(breaks) = self.breaks {
            ticks.retain(|p| !breaks.is_in_any_break(p, false));
        }
        ticks
    }
}

/// Marks ticks that start a new UTC calendar day; when any crossing exists the
/// first tick is marked too.
pub fn rank_day_crossings(positions: &[f64]) -> HigherRanks {
    let mut ranks = HigherRanks::default();
    let mut crossed = false;
    for pair in positions.windows(2) {
        if time::utc_date(pair[0]) != time::utc_date(pair[1]) {
            ranks.insert(pair[1], TimeUnit::Day);
            crossed = true;
        }
    }
    if crossed {
        if let Some(&first) = positions.first() {
            ranks.insert(first, TimeUnit::Day);
        }
    }
    ranks
}
