// File: crates/chart-axis/src/chart.rs
// Summary: Chart struct and the redraw pipeline (extremes, axis tables, grouping, ticks).

use tracing::debug;

use crate::axis::Axis;
use crate::grouping::{self, GroupedSeriesData, GroupingOptions};
use crate::ordinal::{self, OrdinalTable};
use crate::series::Series;
use crate::ticks::TickSet;
use crate::types::AxisExtremes;
use crate::view::data_range;

/// Result of one redraw pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RedrawOutput {
    pub extremes: AxisExtremes,
    pub ticks: TickSet,
    /// One entry per series, in series order.
    pub grouped: Vec<GroupedSeriesData>,
}

#[derive(Clone, Debug)]
pub struct Chart {
    pub series: Vec<Series>,
    pub x_axis: Axis,
    pub grouping: GroupingOptions,
}

impl Default for Chart {
    fn default() -> Self { Self::new() }
}

impl Chart {
    pub fn new() -> Self {
        Self::with_axis(Axis::default_x())
    }

    pub fn with_axis(x_axis: Axis) -> Self {
        Self { series: Vec::new(), x_axis, grouping: GroupingOptions::default() }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
        self.data_changed();
    }

    /// Replaces the data of series `index`; out-of-range indices are ignored.
    pub fn replace_series(&mut self, index: usize, series: Series) {
        if let Some(slot) = self.series.get_mut(index) {
            *slot = series;
            self.data_changed();
        }
    }

    fn data_changed(&mut self) {
        self.x_axis.mark_data_changed();
        if let Some(ext) = data_range(self) {
            self.x_axis.set_data_extremes(ext.data_min, ext.data_max);
        }
    }

    /// Runs one redraw pass: axis tables, then per-series grouping, then ticks.
    pub fn redraw(&mut self) -> RedrawOutput {
        let sets: Vec<&[f64]> = self.series.iter().map(Series::xs).collect();
        self.x_axis.rebuild(&sets);
        // grouping is decided afresh on every pass
        self.x_axis.reset_grouping();

        let ext = self.x_axis.extremes();
        let factor = match self.series.iter().find(|s| !s.is_empty()) {
            Some(s) => {
                let range = s.crop_range(ext.min, ext.max);
                self.x_axis.group_interval_factor(&s.xs()[range])
            }
            None => 1.0,
        };

        let grouped: Vec<GroupedSeriesData> = self
            .series
            .iter()
            .map(|s| grouping::process_series(s, &self.x_axis, &self.grouping, factor))
            .collect();

        if let Some(signature) = grouped.iter().find(|g| g.is_grouped()).map(GroupedSeriesData::signature) {
            let xs: Vec<&[f64]> = grouped.iter().map(|g| g.grouped_x.as_slice()).collect();
            self.x_axis.apply_grouping(&ordinal::merge_positions(&xs), signature);
        }

        let ticks = self.x_axis.tick_positions();
        debug!(
            series = self.series.len(),
            ticks = ticks.len(),
            grouped = grouped.iter().filter(|g| g.is_grouped()).count(),
            "redraw complete"
        );
        RedrawOutput { extremes: ext, ticks, grouped }
    }

    /// Extended ordinal table for panning past the view, built on first use.
    pub fn extended_ordinal_table(&mut self) -> Option<&OrdinalTable> {
        self.x_axis.extended_ordinal_table()
    }
}
