// File: crates/chart-axis/src/lib.rs
// Summary: Library entry point; exports the ordinal axis, axis breaks, tick segmentation and data grouping API.

pub mod approximation;
pub mod axis;
pub mod breaks;
pub mod chart;
pub mod error;
pub mod grouping;
pub mod ordinal;
pub mod scale;
pub mod series;
pub mod ticks;
pub mod time;
pub mod types;
pub mod view;

pub use approximation::{Aggregate, Approximation, Bucket, GroupValue};
pub use axis::{Axis, AxisOptions, AxisVersions, ScaleKind};
pub use breaks::{Break, BreakBehavior, BreakEntry, BreakTable};
pub use chart::{Chart, RedrawOutput};
pub use error::AxisError;
pub use grouping::{GroupInfo, GroupMeta, GroupedSeriesData, GroupingOptions};
pub use ordinal::{GroupingSignature, OrdinalBehavior, OrdinalTable};
pub use scale::{AxisTransform, PixelScale, PixelTranslate};
pub use series::{Candle, PointValue, Series, SeriesType};
pub use ticks::{TickGenerator, TickInfo, TickSegmenter, TickSet};
pub use time::{NormalizedInterval, TimeUnit, UnitSpec};
pub use types::AxisExtremes;
pub use view::ViewState;
