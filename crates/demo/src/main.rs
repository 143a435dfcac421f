// File: crates/demo/src/main.rs
// Summary: Demo loads a time series CSV (close values or OHLC), runs one redraw pass and prints ticks and groups.

use anyhow::{Context, Result};
use chart_axis::grouping::{format_time, GroupingOptions};
use chart_axis::series::{Candle, SeriesType};
use chart_axis::{Chart, GroupValue, PixelTranslate, Series};
use chrono::{DateTime, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AXIS_LENGTH_PX: f64 = 1200.0;
const MAX_PRINTED_GROUPS: usize = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(raw) = args.next() else {
        anyhow::bail!("usage: chart-axis-demo <data.csv> [grouping.json]");
    };
    let path = resolve_path(&raw)?;
    let grouping = match args.next() {
        Some(p) => load_grouping(Path::new(&p))?,
        None => GroupingOptions::default(),
    };

    let series = load_series(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
    if series.is_empty() {
        anyhow::bail!("no rows loaded; check headers and delimiter");
    }
    info!(rows = series.len(), kind = ?series.series_type, "loaded {}", path.display());

    let mut chart = Chart::new();
    chart.grouping = grouping;
    chart.x_axis.set_geometry(0.0, AXIS_LENGTH_PX)?;
    chart.add_series(series);

    let out = chart.redraw();
    println!(
        "View: {} .. {} (ordinal: {})",
        label(out.extremes.min, "%Y-%m-%d %H:%M"),
        label(out.extremes.max, "%Y-%m-%d %H:%M"),
        chart.x_axis.is_ordinal()
    );

    println!("Ticks ({}):", out.ticks.len());
    for &t in &out.ticks.positions {
        let rank = out.ticks.rank_of(t).map(|u| format!(" [{u:?}]")).unwrap_or_default();
        println!("  {:>9.1}px  {}{}", chart.x_axis.translate(t), label(t, "%Y-%m-%d %H:%M"), rank);
    }

    for (series, grouped) in chart.series.iter().zip(&out.grouped) {
        match grouped.interval {
            Some(interval) => println!(
                "Series '{}': {} points in {} groups of {} x {:?}",
                series.name,
                series.len(),
                grouped.len(),
                interval.count,
                interval.unit
            ),
            None => println!("Series '{}': {} points, not grouped", series.name, series.len()),
        }
        for i in 0..grouped.len().min(MAX_PRINTED_GROUPS) {
            let when = grouped.group_label(i).unwrap_or_else(|| label(grouped.grouped_x[i], "%Y-%m-%d"));
            let size = grouped.group_map.get(i).map_or(0, |g| g.length);
            println!("  {when:<40} n={size:<4} {}", describe(grouped.grouped_y[i].as_ref()));
        }
        if grouped.len() > MAX_PRINTED_GROUPS {
            println!("  ... {} more", grouped.len() - MAX_PRINTED_GROUPS);
        }
    }
    Ok(())
}

fn label(t: f64, format: &str) -> String {
    format_time(t, format).unwrap_or_else(|| format!("{t}"))
}

fn describe(value: Option<&GroupValue>) -> String {
    let cell = |v: &Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    match value {
        None => "null".to_string(),
        Some(GroupValue::Single(v)) => format!("{v:.4}"),
        Some(GroupValue::Tuple(vs)) => vs.iter().map(cell).collect::<Vec<_>>().join(" / "),
    }
}

/// Resolve path, trying the .csv/.cvs swap if needed.
fn resolve_path(raw: &str) -> Result<PathBuf> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok(p.to_path_buf());
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            warn!("{} not found, using {}", p.display(), alt.display());
            return Ok(alt);
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => alt.set_extension("csv"),
        "csv" => alt.set_extension("cvs"),
        _ => return None,
    };
    Some(alt)
}

fn load_grouping(path: &Path) -> Result<GroupingOptions> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing grouping options in {}", path.display()))
}

/// Loads OHLC candles when open/high/low/close columns exist, else a line series of the value column.
fn load_series(path: &Path) -> Result<Series> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    info!(?headers, "csv headers");
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"])
        .context("no time column (time, timestamp, open_time, date, datetime)")?;
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let i_value = idx(&["value", "y", "price"]).or(i_close);

    let mut candles = Vec::new();
    let mut points = Vec::new();
    let mut skipped = 0usize;
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("row {}", row + 1))?;
        let parse = |i: Option<usize>| i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok());
        let Some(t) = rec.get(i_time).and_then(parse_time_ms) else {
            skipped += 1;
            continue;
        };
        if let (Some(o), Some(h), Some(l), Some(c)) = (parse(i_open), parse(i_high), parse(i_low), parse(i_close)) {
            match Candle::try_new(t, o, h, l, c) {
                Ok(candle) => candles.push(candle),
                Err(e) => {
                    warn!(row = row + 1, "{e}");
                    skipped += 1;
                }
            }
        } else {
            // an empty value cell is a null point
            points.push((t, parse(i_value)));
        }
    }
    if skipped > 0 {
        warn!(skipped, "rows skipped");
    }

    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("series").to_string();
    if !candles.is_empty() {
        return Ok(Series::from_candles_as(SeriesType::Candlestick, candles).named(name));
    }
    Ok(Series::with_data(SeriesType::Line, points).named(name))
}

/// Epoch seconds, epoch milliseconds, RFC 3339 or `YYYY-MM-DD`, returned as epoch milliseconds.
fn parse_time_ms(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        // below 10^11 reads as seconds
        return Some(if n.abs() < 100_000_000_000 { n as f64 * 1000.0 } else { n as f64 });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis() as f64)
}
