//! Risk classification of a final mould index.
//!
//! Stateless: the tier comes from the index alone, the reference reading is
//! re-extracted from the caller's raw table on every call.

use std::fmt;

use log::warn;
use serde::Serialize;

use crate::config::RiskThresholds;
use crate::data::model::RawTable;
use crate::data::normalize::standardize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn status(self) -> &'static str {
        match self {
            RiskTier::Low => "Environmental conditions unfavorable for mould growth",
            RiskTier::Moderate => "Conditions could potentially support mould growth",
            RiskTier::High => "Conditions highly favorable for mould growth",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk of mould growth",
            RiskTier::Moderate => "Moderate risk - monitor conditions",
            RiskTier::High => "High risk - take action immediately",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        };
        f.write_str(name)
    }
}

/// Tier for an index percentage. Callers must reject non-finite input.
pub fn classify(index: f64, thresholds: &RiskThresholds) -> RiskTier {
    match index {
        i if i < thresholds.low_upper => RiskTier::Low,
        i if i < thresholds.moderate_upper => RiskTier::Moderate,
        _ => RiskTier::High,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_tier: RiskTier,
    pub status_message: String,
    pub index_value: f64,
    /// Most recent reading in the dataset.
    pub reference_temperature: f64,
    pub reference_humidity: f64,
}

/// Classify `index` and attach the latest reading from `table`.
///
/// `None` for a non-finite index or a table that does not normalize.
pub fn assess_risk(
    index: f64,
    table: &RawTable,
    thresholds: &RiskThresholds,
) -> Option<RiskAssessment> {
    if !index.is_finite() {
        warn!("Cannot assess risk of non-finite index {index}");
        return None;
    }
    let readings = match standardize(table) {
        Ok(readings) => readings,
        Err(err) => {
            warn!("Cannot assess risk: {err}");
            return None;
        }
    };
    let latest = readings.last()?;
    let risk_tier = classify(index, thresholds);
    Some(RiskAssessment {
        risk_tier,
        status_message: risk_tier.status().to_string(),
        index_value: index,
        reference_temperature: latest.temperature,
        reference_humidity: latest.humidity,
    })
}

// ---------------------------------------------------------------------------
// Current-condition levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLevel {
    Good,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionStatus {
    pub level: ConditionLevel,
    pub message: &'static str,
}

pub fn temperature_status(celsius: f64) -> ConditionStatus {
    match celsius {
        t if t < 20.0 => ConditionStatus {
            level: ConditionLevel::Good,
            message: "Normal Temperature Range",
        },
        t if t < 25.0 => ConditionStatus {
            level: ConditionLevel::Warning,
            message: "Elevated Temperature",
        },
        _ => ConditionStatus {
            level: ConditionLevel::Danger,
            message: "High Temperature Risk",
        },
    }
}

pub fn humidity_status(percent: f64) -> ConditionStatus {
    match percent {
        h if h < 60.0 => ConditionStatus {
            level: ConditionLevel::Good,
            message: "Normal Humidity Range",
        },
        h if h < 70.0 => ConditionStatus {
            level: ConditionLevel::Warning,
            message: "Elevated Humidity",
        },
        _ => ConditionStatus {
            level: ConditionLevel::Danger,
            message: "High Humidity Risk",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn table() -> RawTable {
        let s = |v: &str| CellValue::String(v.to_string());
        RawTable::from_rows(
            &["time", "temperature", "humidity"],
            vec![
                vec![s("2024-01-01 01:00"), CellValue::Integer(25), CellValue::Integer(85)],
                vec![s("2024-01-01 00:00"), CellValue::Integer(18), CellValue::Integer(60)],
            ],
        )
    }

    #[test]
    fn test_tier_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(classify(10.0, &t), RiskTier::Low);
        assert_eq!(classify(16.69, &t), RiskTier::Low);
        assert_eq!(classify(16.7, &t), RiskTier::Moderate);
        assert_eq!(classify(29.99, &t), RiskTier::Moderate);
        assert_eq!(classify(30.0, &t), RiskTier::High);
        assert_eq!(classify(60.0, &t), RiskTier::High);
    }

    #[test]
    fn test_legacy_threshold_must_be_configured() {
        let legacy = RiskThresholds {
            moderate_upper: 50.0,
            ..Default::default()
        };
        assert_eq!(classify(30.0, &legacy), RiskTier::Moderate);
    }

    #[test]
    fn test_assessment_uses_latest_reading() {
        let a = assess_risk(10.0, &table(), &RiskThresholds::default()).unwrap();
        assert_eq!(a.risk_tier, RiskTier::Low);
        assert_eq!(a.status_message, RiskTier::Low.status());
        assert_eq!(a.reference_temperature, 25.0);
        assert_eq!(a.reference_humidity, 85.0);
        assert_eq!(a.index_value, 10.0);
    }

    #[test]
    fn test_non_finite_index_has_no_assessment() {
        assert!(assess_risk(f64::NAN, &table(), &RiskThresholds::default()).is_none());
    }

    #[test]
    fn test_unusable_table_has_no_assessment() {
        let empty = RawTable::new(vec!["time".into(), "temp".into(), "rh".into()]);
        assert!(assess_risk(20.0, &empty, &RiskThresholds::default()).is_none());
        let no_columns = RawTable::new(vec!["a".into()]);
        assert!(assess_risk(20.0, &no_columns, &RiskThresholds::default()).is_none());
    }

    #[test]
    fn test_condition_levels() {
        assert_eq!(temperature_status(19.9).level, ConditionLevel::Good);
        assert_eq!(temperature_status(20.0).level, ConditionLevel::Warning);
        assert_eq!(temperature_status(25.0).level, ConditionLevel::Danger);
        assert_eq!(humidity_status(59.0).level, ConditionLevel::Good);
        assert_eq!(humidity_status(65.0).message, "Elevated Humidity");
        assert_eq!(humidity_status(70.0).level, ConditionLevel::Danger);
    }
}
