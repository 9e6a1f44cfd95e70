use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a raw sensor export
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Native timestamp column (Parquet), already in UTC.
    DateTime(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric coercion: numbers pass through, numeric strings are parsed,
    /// everything else (including non-finite values) is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RawTable – the untyped dataset handed in by the caller
// ---------------------------------------------------------------------------

/// One row of the source file: header → cell.
pub type RawRow = BTreeMap<String, CellValue>;

/// Rows plus the header names in their original file order.
///
/// Column resolution depends on header order, which is why it is kept
/// separately from the per-row maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from positional rows; missing trailing cells become `Null`.
    pub fn from_rows<I, R>(headers: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = CellValue>,
    {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            let mut cells: Vec<CellValue> = row.into_iter().collect();
            cells.resize(headers.len(), CellValue::Null);
            table.push_row(cells);
        }
        table
    }

    /// Append a row whose cells line up with `headers`.
    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        let row = self.headers.iter().cloned().zip(cells).collect();
        self.rows.push(row);
    }

    /// Register a header if it has not been seen yet (record-oriented inputs).
    pub fn ensure_header(&mut self, name: &str) {
        if !self.headers.iter().any(|h| h == name) {
            self.headers.push(name.to_string());
        }
    }

    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&CellValue::Null)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reading – one canonical, fully-typed measurement
// ---------------------------------------------------------------------------

/// A normalized measurement: non-null, finite, timestamp in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}
