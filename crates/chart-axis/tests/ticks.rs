// File: crates/chart-axis/tests/ticks.rs
// Purpose: Time units and time ticks, segmenting at gaps, rank marking and thinning.

use chart_axis::breaks::{Break, BreakBehavior};
use chart_axis::scale::{Identity, PixelScale, PixelTranslate};
use chart_axis::ticks::{rank_day_crossings, LinearTickGenerator, TickSegmenter, TimeTickGenerator};
use chart_axis::time::{self, NormalizedInterval, TimeUnit, UnitSpec};
use chart_axis::AxisError;
use chrono::{NaiveDate, TimeZone, Utc};

const HOUR: f64 = 3_600_000.0;
const DAY: f64 = 24.0 * HOUR;

fn ms(y: i32, m: u32, d: u32) -> f64 {
    let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()).timestamp_millis() as f64
}

#[test]
fn segments_split_at_large_gaps() {
    let candidates = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0];
    let ticks = TickSegmenter::for_groups(&Identity).ordinal(true).compute(
        &candidates,
        1.0,
        12.0,
        1.0,
        &LinearTickGenerator::new(1.0),
    );
    assert_eq!(ticks.positions, candidates.to_vec());
    assert_eq!(ticks.info.segment_starts, vec![0, 3]);
}

#[test]
fn short_or_linear_input_delegates_to_the_generator() {
    let gen = LinearTickGenerator::new(1.0);
    let few = TickSegmenter::for_ticks(&Identity, 1.0).ordinal(true).compute(&[1.0, 2.0], 0.0, 4.0, 1.0, &gen);
    assert_eq!(few.positions, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

    let candidates = [0.0, 1.0, 2.0, 3.0, 9.0, 10.0];
    let linear = TickSegmenter::for_ticks(&Identity, 1.0).compute(&candidates, 0.0, 10.0, 1.0, &gen);
    assert_eq!(linear.len(), 11);
    assert!(linear.info.segment_starts.is_empty());
}

#[test]
fn gapped_hourly_ticks_are_ranked_and_thinned() {
    // one day of hourly data, a two day gap, one more day
    let candidates: Vec<f64> = (0..24).chain(72..96).map(|h| h as f64 * HOUR).collect();
    let (min, max) = (0.0, 95.0 * HOUR);
    let pixels = PixelScale::new(0.0, 480.0, min, max);
    let gen = TimeTickGenerator::new(NormalizedInterval::new(TimeUnit::Hour, 6.0), 1);

    let ticks = TickSegmenter::for_ticks(&pixels, 100.0).ordinal(true).compute(&candidates, min, max, HOUR, &gen);

    let hours: Vec<f64> = ticks.positions.iter().map(|p| p / HOUR).collect();
    assert_eq!(hours, vec![0.0, 24.0, 72.0, 90.0, 96.0]);
    assert_eq!(ticks.info.segment_starts, vec![0, 2]);
    assert_eq!(ticks.rank_of(0.0), Some(TimeUnit::Day));
    assert_eq!(ticks.rank_of(72.0 * HOUR), Some(TimeUnit::Day));
    assert_eq!(ticks.rank_of(90.0 * HOUR), None);

    for p in &ticks.positions {
        assert!(*p >= min && *p <= max + HOUR);
    }
    for w in ticks.positions.windows(2) {
        assert!(w[1] > w[0]);
        let dist = pixels.translate(w[1]) - pixels.translate(w[0]);
        assert!(dist >= 80.0 || ticks.rank_of(w[0]).is_some() || ticks.rank_of(w[1]).is_some());
    }
}

#[test]
fn day_crossings_mark_the_later_tick_and_the_first() {
    let ranks = rank_day_crossings(&[22.0 * HOUR, 23.0 * HOUR, 24.0 * HOUR, 25.0 * HOUR]);
    assert_eq!(ranks.len(), 2);
    assert!(ranks.contains(22.0 * HOUR));
    assert!(ranks.contains(24.0 * HOUR));
    assert!(rank_day_crossings(&[HOUR, 2.0 * HOUR]).is_empty());
}

#[test]
fn ticks_inside_breaks_are_dropped() {
    let breaks = BreakBehavior::new(vec![Break::new(5.0, 10.0)]);
    let candidates: Vec<f64> = (0..=20).map(f64::from).collect();
    let ticks = TickSegmenter::for_ticks(&Identity, 1.0).breaks(Some(&breaks)).compute(
        &candidates,
        0.0,
        20.0,
        1.0,
        &LinearTickGenerator::new(1.0),
    );
    assert!(ticks.positions.iter().all(|p| !(5.0..10.0).contains(p)));
    assert!(ticks.positions.contains(&10.0));
    assert_eq!(ticks.len(), 16);
}

#[test]
fn time_intervals_normalize_to_units() {
    let units = time::default_grouping_units();
    let day = time::normalize_time_tick_interval(1.5 * DAY, &units);
    assert_eq!((day.unit, day.count), (TimeUnit::Day, 1.0));

    let years = time::normalize_time_tick_interval(3.0 * 364.0 * DAY, &units);
    assert_eq!((years.unit, years.count), (TimeUnit::Year, 2.0));

    let hours = time::normalize_time_tick_interval(5.0 * HOUR, &units);
    assert_eq!((hours.unit, hours.count), (TimeUnit::Hour, 4.0));

    assert_eq!(time::normalize_tick_interval(3.2, None, 1.0), 2.5);
    assert_eq!(time::normalize_tick_interval(42.0, None, 10.0), 50.0);
}

#[test]
fn unit_specs_parse_from_text() -> anyhow::Result<()> {
    let spec: UnitSpec = "hour:1,2,6".parse()?;
    assert_eq!(spec, UnitSpec::new(TimeUnit::Hour, &[1.0, 2.0, 6.0]));

    let units = time::parse_units("day:1; week:1; year")?;
    assert_eq!(units.len(), 3);
    assert_eq!(units[2], UnitSpec::any(TimeUnit::Year));

    assert_eq!("fortnight".parse::<TimeUnit>(), Err(AxisError::UnknownTimeUnit("fortnight".into())));
    Ok(())
}

#[test]
fn monthly_ticks_step_by_calendar_month() {
    let ticks = time::time_ticks(&NormalizedInterval::new(TimeUnit::Month, 1.0), ms(2024, 1, 15), ms(2024, 4, 10), 1);
    let expected = vec![ms(2024, 1, 1), ms(2024, 2, 1), ms(2024, 3, 1), ms(2024, 4, 1), ms(2024, 5, 1)];
    assert_eq!(ticks.positions, expected);
    assert_eq!(ticks.info.unit, Some(TimeUnit::Month));
}

#[test]
fn weekly_ticks_align_to_start_of_week() {
    // 2024-01-10 is a Wednesday
    let ticks = time::time_ticks(&NormalizedInterval::new(TimeUnit::Week, 1.0), ms(2024, 1, 10), ms(2024, 1, 20), 1);
    assert_eq!(ticks.positions, vec![ms(2024, 1, 8), ms(2024, 1, 15), ms(2024, 1, 22)]);

    let sunday = time::time_ticks(&NormalizedInterval::new(TimeUnit::Week, 1.0), ms(2024, 1, 10), ms(2024, 1, 12), 0);
    assert_eq!(sunday.positions[0], ms(2024, 1, 7));
}

#[test]
fn hourly_ticks_mark_midnight() {
    let ticks = time::time_ticks(&NormalizedInterval::new(TimeUnit::Hour, 6.0), 13.0 * HOUR, 40.0 * HOUR, 1);
    let hours: Vec<f64> = ticks.positions.iter().map(|p| p / HOUR).collect();
    assert_eq!(hours, vec![12.0, 18.0, 24.0, 30.0, 36.0, 42.0]);
    assert_eq!(ticks.rank_of(24.0 * HOUR), Some(TimeUnit::Day));
    assert_eq!(ticks.info.higher_ranks.len(), 1);
}
