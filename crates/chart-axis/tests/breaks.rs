// File: crates/chart-axis/tests/breaks.rs
// Purpose: Break membership, table merging, compensated translation and extreme clamping.

use chart_axis::breaks::{is_in_break, Break, BreakBehavior, BreakEntry, BreakTable};
use chart_axis::scale::PixelTranslate;
use chart_axis::{Axis, AxisError, AxisOptions};

#[test]
fn membership_is_half_open_unless_inclusive() {
    let b = Break::new(10.0, 20.0);
    assert!(is_in_break(&b, 10.0));
    assert!(is_in_break(&b, 15.0));
    assert!(!is_in_break(&b, 20.0));
    assert!(!is_in_break(&b, 9.99));
    assert!(is_in_break(&b.clone().inclusive(), 20.0));
}

#[test]
fn repeating_break_uses_the_phase() {
    let weekend = Break::new(0.0, 2.0).repeating(7.0);
    assert!(is_in_break(&weekend, 7.5));
    assert!(!is_in_break(&weekend, 9.0));
    assert!(is_in_break(&weekend, -6.0));
    assert!(is_in_break(&weekend, -7.0));
    assert!(!is_in_break(&weekend, -4.0));
}

#[test]
fn malformed_breaks_are_no_ops() {
    let inverted = Break::new(20.0, 10.0);
    assert!(inverted.is_empty());
    assert!(!is_in_break(&inverted, 15.0));
    let table = BreakTable::build(&[inverted, Break::new(5.0, 5.0)], 0.0, 100.0);
    assert!(table.entries.is_empty());
    assert_eq!(table.unit_length, 100.0);
}

#[test]
fn overlapping_breaks_merge_into_one_entry() {
    let table = BreakTable::build(&[Break::new(10.0, 20.0), Break::new(15.0, 25.0)], 0.0, 100.0);
    assert_eq!(table.entries, vec![BreakEntry { from: 10.0, to: 25.0, len: 15.0 }]);
    assert_eq!(table.unit_length, 85.0);
}

#[test]
fn adjacent_breaks_merge_too() {
    let table = BreakTable::build(&[Break::new(20.0, 30.0), Break::new(10.0, 20.0)], 0.0, 100.0);
    assert_eq!(table.entries, vec![BreakEntry { from: 10.0, to: 30.0, len: 20.0 }]);
}

#[test]
fn repeating_breaks_expand_over_the_range() {
    let table = BreakTable::build(&[Break::new(5.0, 7.0).repeating(10.0)], 0.0, 40.0);
    let froms: Vec<f64> = table.entries.iter().map(|e| e.from).collect();
    assert_eq!(froms, vec![5.0, 15.0, 25.0, 35.0]);
    assert!(table.entries.iter().all(|e| e.len == 2.0));
    assert_eq!(table.unit_length, 32.0);
}

#[test]
fn extremes_inside_a_break_move_to_its_edges() {
    let breaks = [Break::new(10.0, 20.0)];
    let t = BreakTable::build(&breaks, 15.0, 50.0);
    assert_eq!(t.min, 20.0);
    assert!(t.entries.is_empty());
    assert_eq!(t.unit_length, 30.0);

    let t = BreakTable::build(&breaks, 0.0, 15.0);
    assert_eq!(t.max, 10.0);
}

#[test]
fn compensation_round_trips_outside_breaks() {
    let table = BreakTable::build(&[Break::new(10.0, 20.0), Break::new(40.0, 45.0)], 0.0, 100.0);
    assert_eq!(table.to_compensated(5.0), 5.0);
    assert_eq!(table.to_compensated(15.0), 10.0);
    assert_eq!(table.to_compensated(25.0), 15.0);
    assert_eq!(table.to_compensated(50.0), 35.0);
    for v in [0.0, 5.0, 9.5, 20.0, 25.0, 39.0, 45.0, 60.0, 100.0] {
        assert_eq!(table.from_compensated(table.to_compensated(v)), v, "value {v}");
    }
}

#[test]
fn break_size_keeps_part_of_the_break() {
    let table = BreakTable::build(&[Break::new(10.0, 20.0).with_break_size(2.0)], 0.0, 100.0);
    assert_eq!(table.entries[0].len, 8.0);
    assert_eq!(table.to_compensated(25.0), 17.0);
    assert_eq!(table.from_compensated(17.0), 25.0);
}

#[test]
fn clamp_pushes_extremes_outward() {
    let b = BreakBehavior::new(vec![Break::new(10.0, 20.0)]);
    assert_eq!(b.clamp_extremes(12.0, 50.0, 5.0), (7.0, 50.0));
    assert_eq!(b.clamp_extremes(0.0, 15.0, 5.0), (0.0, 20.0));
    assert_eq!(b.clamp_extremes(0.0, 50.0, 5.0), (0.0, 50.0));
}

#[test]
fn shown_points_are_kept_visible() {
    let b = BreakBehavior::new(vec![Break::new(10.0, 20.0).with_show_points(true)]);
    assert!(b.is_in_any_break(15.0, false));
    assert!(!b.is_in_any_break(15.0, true));
}

#[test]
fn breaks_turn_ordinal_off_and_shrink_the_axis() -> anyhow::Result<()> {
    let opts = AxisOptions { breaks: vec![Break::new(10.0, 20.0)], ..AxisOptions::default() };
    let mut axis = Axis::new("x", opts);
    assert!(axis.ordinal().is_none());
    assert!(axis.has_breaks());

    axis.set_geometry(0.0, 100.0)?;
    axis.set_data_extremes(0.0, 30.0);
    let xs: Vec<f64> = (0..=30).map(f64::from).collect();
    axis.rebuild(&[xs]);

    assert!((axis.translate(9.0) - 45.0).abs() < 1e-9);
    assert!((axis.translate(21.0) - 55.0).abs() < 1e-9);
    assert!((axis.untranslate(55.0) - 21.0).abs() < 1e-9);
    assert!(axis.is_point_hidden(12.0));
    assert!(!axis.is_point_hidden(20.0));
    Ok(())
}

#[test]
fn invalid_geometry_is_rejected() {
    let mut axis = Axis::default_x();
    assert_eq!(axis.set_geometry(0.0, 0.0), Err(AxisError::InvalidAxisLength(0.0)));
    assert!(axis.set_geometry(0.0, f64::NAN).is_err());
}
