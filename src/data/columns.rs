use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::error::MouldError;

// ---------------------------------------------------------------------------
// Canonical fields and their header synonyms
// ---------------------------------------------------------------------------

/// Header fragments recognised as the timestamp column, in priority order.
pub const TIMESTAMP_SYNONYMS: &[&str] = &[
    "timestamp",
    "local date/time",
    "utc date/time",
    "date/time",
    "date",
    "time",
    "datetime",
    "measurement time",
];

pub const TEMPERATURE_SYNONYMS: &[&str] = &[
    "temperature",
    "temperature (°c)",
    "temperature (c)",
    "temperature (ºc)",
    "heat index (°c)",
    "temp",
    "temp(°c)",
    "temp(c)",
    "temp °c",
    "temp c",
    "t(°c)",
    "t(c)",
    "t °c",
    "t c",
];

pub const HUMIDITY_SYNONYMS: &[&str] = &[
    "humidity",
    "humidity (%)",
    "relative humidity",
    "rh (%)",
    "rh",
    "humidity%",
    "rh%",
    "relative humidity (%)",
    "humidity level",
];

/// The three columns every analysis needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalField {
    Timestamp,
    Temperature,
    Humidity,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 3] = [
        CanonicalField::Timestamp,
        CanonicalField::Temperature,
        CanonicalField::Humidity,
    ];

    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Timestamp => TIMESTAMP_SYNONYMS,
            CanonicalField::Temperature => TEMPERATURE_SYNONYMS,
            CanonicalField::Humidity => HUMIDITY_SYNONYMS,
        }
    }

    /// Whether a header names this field (case and surrounding whitespace ignored).
    pub fn matches(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.synonyms().iter().any(|syn| header.contains(syn))
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CanonicalField::Timestamp => "Timestamp",
            CanonicalField::Temperature => "Temperature",
            CanonicalField::Humidity => "Humidity",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Original header names chosen for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub timestamp: String,
    pub temperature: String,
    pub humidity: String,
}

/// First header (in file order) that names `field`.
pub fn find_column<'a>(headers: &'a [String], field: CanonicalField) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| field.matches(h))
        .map(|h| h.as_str())
}

/// Map arbitrary export headers onto timestamp / temperature / humidity.
///
/// Fails with every unresolvable field listed, in canonical order.
pub fn resolve_columns(headers: &[String]) -> Result<ResolvedColumns, MouldError> {
    debug!("Available columns: {headers:?}");

    let timestamp = find_column(headers, CanonicalField::Timestamp);
    let temperature = find_column(headers, CanonicalField::Temperature);
    let humidity = find_column(headers, CanonicalField::Humidity);

    let (Some(timestamp), Some(temperature), Some(humidity)) = (timestamp, temperature, humidity)
    else {
        let missing = [
            (CanonicalField::Timestamp, timestamp.is_none()),
            (CanonicalField::Temperature, temperature.is_none()),
            (CanonicalField::Humidity, humidity.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();
        return Err(MouldError::MissingColumns(missing));
    };

    let resolved = ResolvedColumns {
        timestamp: timestamp.to_string(),
        temperature: temperature.to_string(),
        humidity: humidity.to_string(),
    };
    info!(
        "Resolved columns: timestamp='{}', temperature='{}', humidity='{}'",
        resolved.timestamp, resolved.temperature, resolved.humidity
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_every_synonym_resolves_to_its_field() {
        for field in CanonicalField::ALL {
            for syn in field.synonyms() {
                let padded = format!("  {}  ", syn.to_uppercase());
                assert!(field.matches(&padded), "{syn} should match {field}");
            }
        }
    }

    #[test]
    fn test_resolves_typical_export_headers() {
        let cols = resolve_columns(&headers(&["Timestamp", "Temp(°C)", "RH (%)"])).unwrap();
        assert_eq!(cols.timestamp, "Timestamp");
        assert_eq!(cols.temperature, "Temp(°C)");
        assert_eq!(cols.humidity, "RH (%)");
    }

    #[test]
    fn test_keeps_original_header_spelling() {
        let cols =
            resolve_columns(&headers(&[" Local Date/Time ", "TEMPERATURE", "Relative Humidity"]))
                .unwrap();
        assert_eq!(cols.timestamp, " Local Date/Time ");
        assert_eq!(cols.temperature, "TEMPERATURE");
    }

    #[test]
    fn test_first_matching_header_wins() {
        let cols = resolve_columns(&headers(&[
            "Device",
            "UTC Date/Time",
            "Local Date/Time",
            "Temperature",
            "Humidity",
        ]))
        .unwrap();
        assert_eq!(cols.timestamp, "UTC Date/Time");
    }

    #[test]
    fn test_reports_single_missing_field() {
        let err = resolve_columns(&headers(&["time", "temperature"])).unwrap_err();
        assert_eq!(err, MouldError::MissingColumns(vec![CanonicalField::Humidity]));
    }

    #[test]
    fn test_reports_all_missing_fields_in_order() {
        let err = resolve_columns(&headers(&["foo", "bar"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required columns: Timestamp, Temperature, Humidity"
        );
    }

    #[test]
    fn test_empty_headers_miss_everything() {
        let err = resolve_columns(&[]).unwrap_err();
        assert_eq!(err, MouldError::MissingColumns(CanonicalField::ALL.to_vec()));
    }
}
