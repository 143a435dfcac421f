// File: crates/chart-axis/tests/ordinal.rs
// Purpose: Ordinal index build rules, index/linear round trips and cached extras.

use chart_axis::ordinal::{
    self, ExtendedPositionsRequest, GroupingSignature, OrdinalBehavior, OrdinalOptions, OrdinalTable,
};
use chart_axis::scale::AxisTransform;
use chart_axis::time::TimeUnit;
use chart_axis::AxisExtremes;

const DAY: f64 = 86_400_000.0;
// Monday 2024-01-01 00:00 UTC
const START: f64 = 1_704_067_200_000.0;
const WEEKLY: GroupingSignature = GroupingSignature::Grouped { unit: TimeUnit::Week, count: 1.0 };

fn table(positions: &[f64]) -> OrdinalTable {
    let ext = AxisExtremes::from_data(positions[0], positions[positions.len() - 1]);
    ordinal::build(positions, &ext, &OrdinalOptions::default())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn non_uniform_spacing_enables_ordinal() {
    let t = table(&[0.0, 1.0, 2.0, 5.0, 6.0]);
    assert_eq!(t.positions, vec![0.0, 1.0, 2.0, 5.0, 6.0]);
}

#[test]
fn uniform_spacing_disables_ordinal() {
    assert!(table(&[0.0, 1.0, 2.0, 3.0, 4.0]).is_empty());
    // binary noise in the gaps still counts as uniform
    assert!(table(&[0.0, 0.1, 0.2, 0.30000000000000004]).is_empty());
}

#[test]
fn padded_view_enables_ordinal_unless_padding_is_kept() {
    let positions = [0.0, 1.0, 2.0, 3.0, 4.0];
    let padded = AxisExtremes::new(-5.0, 4.0, 0.0, 4.0);
    assert_eq!(ordinal::build(&positions, &padded, &OrdinalOptions::default()).len(), 5);

    let keep = OrdinalOptions { keep_padding: true, ..OrdinalOptions::default() };
    assert!(ordinal::build(&positions, &padded, &keep).is_empty());
}

#[test]
fn fewer_than_three_distinct_points_fail_closed() {
    assert!(table(&[1.0]).is_empty());
    assert!(table(&[1.0, 5.0]).is_empty());
    assert!(table(&[1.0, 1.0, 5.0, 5.0]).is_empty());
}

#[test]
fn unsorted_input_with_ties_is_sorted_and_deduplicated() {
    let ext = AxisExtremes::from_data(1.0, 9.0);
    let t = ordinal::build(&[5.0, 1.0, 1.0, 2.0, 9.0], &ext, &OrdinalOptions::default());
    assert_eq!(t.positions, vec![1.0, 2.0, 5.0, 9.0]);
    assert_eq!(ordinal::merge_positions(&[vec![3.0, 1.0], vec![1.0, 2.0]]), vec![1.0, 2.0, 3.0]);
}

#[test]
fn index_round_trips() {
    let t = table(&[0.0, 1.0, 3.0, 7.0, 15.0]);
    for k in 0..=16 {
        let i = k as f64 * 0.25;
        assert!(close(t.to_index(t.from_index(i)), i), "index {i}");
    }
    for k in 0..=60 {
        let v = k as f64 * 0.25;
        assert!(close(t.from_index(t.to_index(v)), v), "value {v}");
    }
}

#[test]
fn to_index_extrapolates_and_from_index_clamps() {
    let t = table(&[0.0, 1.0, 3.0, 7.0, 15.0]);
    assert!(close(t.to_index(-1.0), -1.0));
    assert!(close(t.to_index(23.0), 5.0));
    assert!(close(t.to_index(5.0), 2.5));
    assert_eq!(t.from_index(-3.0), 0.0);
    assert_eq!(t.from_index(10.0), 15.0);
}

#[test]
fn slope_and_offset_follow_the_view() {
    let t = table(&[0.0, 1.0, 3.0, 7.0, 15.0]);
    assert!(close(t.slope, 15.0 / 4.0));
    assert!(close(t.offset, 0.0));
    assert!(close(t.to_linear(3.0), 7.5));
    assert!(close(t.from_linear(7.5), 3.0));
    // outside the table both directions extrapolate the end pair
    assert!(close(t.to_linear(23.0), 18.75));
    assert!(close(t.from_linear(18.75), 23.0));
    assert!(close(t.from_linear(t.to_linear(-2.0)), -2.0));
}

#[test]
fn extended_table_measures_values_past_the_view() {
    let mut main = OrdinalTable::from_positions(vec![1.0, 3.0, 7.0]);
    main.fit_view(1.0, 7.0);
    let ext = OrdinalTable::from_positions(vec![0.0, 1.0, 3.0, 7.0, 15.0, 20.0]);

    assert!(close(main.to_linear_extended(15.0, &ext), main.slope * 3.0 + main.offset));
    for v in [-4.0, 0.0, 0.5, 2.0, 10.0, 15.0, 20.0, 26.0] {
        let lin = main.to_linear_extended(v, &ext);
        assert!(close(main.from_linear_extended(lin, &ext), v), "value {v}");
    }
}

#[test]
fn overscroll_appends_synthetic_positions() {
    let ext = AxisExtremes::from_data(0.0, 4.0);
    let opts = OrdinalOptions { overscroll: 3.0, ..OrdinalOptions::default() };
    let t = ordinal::build(&[0.0, 1.0, 3.0, 4.0], &ext, &opts);
    assert_eq!(t.positions, vec![0.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn extended_tables_are_dropped_when_data_changes() {
    let coords = vec![0.0, 1.0, 3.0, 4.0, 8.0];
    let ext = AxisExtremes::from_data(0.0, 8.0);
    let mut o = OrdinalBehavior::new(OrdinalOptions::default());

    o.rebuild(&[&coords[..]], &ext, 1);
    assert!(o.is_active());
    assert!(o.cached_extended_table().is_none());
    assert_eq!(o.extended_table().map(OrdinalTable::len), Some(5));
    assert!(o.cached_extended_table().is_some());

    o.rebuild(&[&coords[..]], &ext, 1);
    assert!(o.cached_extended_table().is_some(), "same data version keeps the cache");

    o.rebuild(&[&coords[..]], &ext, 2);
    assert!(o.cached_extended_table().is_none());
}

/// Weekdays of five weeks with the fourth week missing.
fn weekdays_with_missing_week() -> Vec<f64> {
    (0..35).filter(|d| d % 7 < 5 && !(21..28).contains(d)).map(|d| START + d as f64 * DAY).collect()
}

fn days(offsets: &[f64]) -> Vec<f64> {
    offsets.iter().map(|d| START + d * DAY).collect()
}

#[test]
fn grouped_extended_table_holds_week_starts_and_overscroll() {
    let coords = weekdays_with_missing_week();
    let t = ordinal::extended_table(&ExtendedPositionsRequest {
        coordinates: &coords,
        signature: WEEKLY,
        extra_range: 14.0 * DAY,
        closest_distance: DAY,
        start_of_week: 1,
    });
    // the empty week still gets a start; the tail runs to the last point plus 14 days
    assert_eq!(t.positions, days(&[0.0, 7.0, 14.0, 21.0, 28.0, 35.0, 42.0]));
    assert!(t.positions.iter().all(|p| (p - START).rem_euclid(7.0 * DAY) == 0.0));

    let raw = ordinal::extended_table(&ExtendedPositionsRequest {
        coordinates: &coords,
        signature: GroupingSignature::Raw,
        extra_range: 2.0 * DAY,
        closest_distance: DAY,
        start_of_week: 1,
    });
    assert_eq!(raw.len(), coords.len() + 2);
}

#[test]
fn raw_and_grouped_extended_tables_are_cached_side_by_side() {
    let coords = weekdays_with_missing_week();
    let ext = AxisExtremes::from_data(coords[0], coords[coords.len() - 1]);
    let opts = OrdinalOptions { overscroll: 14.0 * DAY, start_of_week: 1, ..OrdinalOptions::default() };
    let mut o = OrdinalBehavior::new(opts);
    o.rebuild(&[&coords[..]], &ext, 1);
    let raw_index = o.table().clone();

    assert_eq!(o.extended_table().map(OrdinalTable::len), Some(34));
    assert!(o.apply_grouping(&days(&[0.0, 7.0, 14.0, 28.0]), WEEKLY, &ext));
    assert_eq!(o.signature(), WEEKLY);
    assert_eq!(o.extended_table().map(OrdinalTable::len), Some(7));

    assert_eq!(o.cache().extended(GroupingSignature::Raw).map(OrdinalTable::len), Some(34));
    assert_eq!(o.cache().extended(WEEKLY).map(OrdinalTable::len), Some(7));
    let daily = GroupingSignature::Grouped { unit: TimeUnit::Day, count: 1.0 };
    assert!(o.cache().extended(daily).is_none());

    o.reset_grouping();
    assert_eq!(o.signature(), GroupingSignature::Raw);
    assert_eq!(o.table(), &raw_index);
    assert_eq!(o.cached_extended_table().map(OrdinalTable::len), Some(34));
}

#[test]
fn evenly_spaced_groups_keep_the_raw_index() {
    let coords = weekdays_with_missing_week();
    let ext = AxisExtremes::from_data(coords[0], coords[coords.len() - 1]);
    let mut o = OrdinalBehavior::new(OrdinalOptions::default());
    o.rebuild(&[&coords[..]], &ext, 1);
    let raw_index = o.table().clone();

    // group starts one week apart space linearly; the view ends 4 days past the last one
    assert!(!o.apply_grouping(&days(&[0.0, 7.0, 14.0, 21.0, 28.0]), WEEKLY, &ext));
    assert_eq!(o.signature(), GroupingSignature::Raw);
    assert_eq!(o.table(), &raw_index);
}

#[test]
fn transform_is_identity_when_inactive() {
    let mut o = OrdinalBehavior::new(OrdinalOptions::default());
    o.rebuild(&[vec![0.0, 1.0, 2.0, 3.0]], &AxisExtremes::from_data(0.0, 3.0), 1);
    assert!(!o.is_active());
    assert_eq!(o.to_linear(2.5), 2.5);
    assert_eq!(o.from_linear(2.5), 2.5);
}

#[test]
fn group_interval_factor_exceeds_one_across_a_weekend() {
    // Thu, Fri, Mon, Tue
    let xs = [0.0, DAY, 4.0 * DAY, 5.0 * DAY];
    let f = ordinal::estimate_group_interval_factor(xs[0], xs[3], &xs);
    assert!(close(f, 2.4));
    assert!(f > 1.0);

    let uniform: Vec<f64> = (0..10).map(|i| i as f64 * DAY).collect();
    let f = ordinal::estimate_group_interval_factor(-1e15, 1e15, &uniform);
    assert!(close(f, 10.0 / 9.0));
}

#[test]
fn group_interval_factor_is_cached_until_rebuild() {
    let coords = vec![0.0, DAY, 4.0 * DAY, 5.0 * DAY];
    let ext = AxisExtremes::from_data(0.0, 5.0 * DAY);
    let mut o = OrdinalBehavior::new(OrdinalOptions::default());
    o.rebuild(&[&coords[..]], &ext, 1);

    let first = o.group_interval_factor(ext.min, ext.max, &coords);
    let again = o.group_interval_factor(ext.min, ext.max, &[0.0, 1.0, 2.0]);
    assert_eq!(first, again);

    o.rebuild(&[&coords[..]], &ext, 1);
    let fresh = o.group_interval_factor(0.0, 2.0, &[0.0, 1.0, 2.0]);
    assert!(close(fresh, 1.5));
}

#[test]
fn tick_interval_is_converted_back_to_real_units() {
    let mut o = OrdinalBehavior::new(OrdinalOptions::default());
    o.rebuild(&[vec![0.0, 1.0, 3.0, 7.0, 15.0]], &AxisExtremes::from_data(0.0, 15.0), 1);
    assert!(close(o.post_process_tick_interval(7.5, 1.0), 2.0));
}
