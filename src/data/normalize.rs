use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

use super::columns::{resolve_columns, ResolvedColumns};
use super::model::{CellValue, RawTable, Reading};
use crate::error::MouldError;

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Naive date-time layouts seen in sensor exports. Month-first slashes are
/// tried before day-first ones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Parse a timestamp string to a UTC naive date-time.
///
/// Offsets (RFC 3339 / `+hh:mm` suffixes) are converted to UTC; naive
/// values are taken as-is.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Interpret a cell as an instant. Numbers are Unix epoch seconds.
pub fn cell_timestamp(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::String(s) => parse_timestamp(s),
        CellValue::Integer(secs) => DateTime::from_timestamp(*secs, 0).map(|dt| dt.naive_utc()),
        CellValue::Float(secs) if secs.is_finite() => {
            DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
                .map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Build the canonical, time-sorted reading sequence from resolved columns.
///
/// Cells that fail to parse null out their row, and such rows are dropped.
/// Returns [`MouldError::EmptyDataset`] if nothing survives.
pub fn normalize(table: &RawTable, columns: &ResolvedColumns) -> Result<Vec<Reading>, MouldError> {
    let mut readings: Vec<Reading> = (0..table.len())
        .filter_map(|row| {
            let ts_cell = table.cell(row, &columns.timestamp);
            let temp_cell = table.cell(row, &columns.temperature);
            let rh_cell = table.cell(row, &columns.humidity);
            let reading = match (cell_timestamp(ts_cell), temp_cell.as_f64(), rh_cell.as_f64()) {
                (Some(timestamp), Some(temperature), Some(humidity)) => Some(Reading {
                    timestamp,
                    temperature,
                    humidity,
                }),
                _ => None,
            };
            if reading.is_none() {
                debug!("Dropping row {row}: timestamp={ts_cell}, temperature={temp_cell}, humidity={rh_cell}");
            }
            reading
        })
        .collect();

    let dropped = table.len() - readings.len();
    if dropped > 0 {
        debug!("Dropped {dropped} of {} rows with unusable cells", table.len());
    }
    if readings.is_empty() {
        return Err(MouldError::EmptyDataset);
    }

    // Stable, so rows sharing a timestamp keep their file order.
    readings.sort_by_key(|r| r.timestamp);
    Ok(readings)
}

/// Resolve columns and normalize in one step.
pub fn standardize(table: &RawTable) -> Result<Vec<Reading>, MouldError> {
    let columns = resolve_columns(&table.headers)?;
    normalize(table, &columns)
}
