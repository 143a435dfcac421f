// File: crates/chart-axis/src/error.rs
// Summary: Error type for configuration boundaries (unit names, geometry, candles).

use thiserror::Error;

/// Errors raised while building validated configuration values.
///
/// Numeric axis operations never fail; they fall back to linear or ungrouped
/// behavior instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    #[error("unknown time unit: {0:?}")]
    UnknownTimeUnit(String),

    #[error("invalid axis length: {0} px")]
    InvalidAxisLength(f64),

    #[error("invalid candle: {0}")]
    InvalidCandle(&'static str),
}

pub type Result<T> = std::result::Result<T, AxisError>;
