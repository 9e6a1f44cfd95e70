use std::fmt;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::model::RawTable;
use crate::error::MouldError;
use crate::risk::{
    assess_risk, humidity_status, temperature_status, ConditionStatus, RiskAssessment,
};
use crate::simulation::series::IndexSample;
use crate::simulation::{simulate, SkippedRow, Timeframe};

/// Everything an upload produces: index, tier, current conditions, series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub risk: RiskAssessment,
    pub advice: &'static str,
    pub temperature: ConditionStatus,
    pub humidity: ConditionStatus,
    pub index_percentage: f64,
    pub timeframe: Timeframe,
    pub series: Vec<IndexSample>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Simulate, then classify against the same raw table.
pub fn analyze(table: &RawTable, config: &AnalysisConfig) -> Result<AnalysisReport, MouldError> {
    let outcome = simulate(table, config.rolling_window_days)?;
    let risk = assess_risk(outcome.index_percentage, table, &config.thresholds)
        .ok_or(MouldError::EmptyDataset)?;

    Ok(AnalysisReport {
        advice: risk.risk_tier.advice(),
        temperature: temperature_status(risk.reference_temperature),
        humidity: humidity_status(risk.reference_humidity),
        index_percentage: outcome.index_percentage,
        timeframe: outcome.timeframe,
        series: outcome.series,
        skipped_rows: outcome.skipped,
        risk,
    })
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mould index:  {:.2}%  ({})", self.index_percentage, self.timeframe)?;
        writeln!(f, "Risk level:   {} - {}", self.risk.risk_tier, self.risk.status_message)?;
        writeln!(f, "              {}", self.advice)?;
        writeln!(
            f,
            "Temperature:  {:.1} °C  ({})",
            self.risk.reference_temperature, self.temperature.message
        )?;
        writeln!(
            f,
            "Humidity:     {:.1} %   ({})",
            self.risk.reference_humidity, self.humidity.message
        )?;
        write!(f, "Series:       {} points", self.series.len())?;
        if !self.skipped_rows.is_empty() {
            write!(f, ", {} rows skipped", self.skipped_rows.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::risk::{ConditionLevel, RiskTier};

    fn constant_table(rows: usize, temperature: f64, humidity: f64) -> RawTable {
        RawTable::from_rows(
            &["Timestamp", "Temperature (°C)", "Humidity (%)"],
            (0..rows).map(|h| {
                vec![
                    CellValue::String(format!("2025-01-01 {h:02}:00")),
                    CellValue::Float(temperature),
                    CellValue::Float(humidity),
                ]
            }),
        )
    }

    #[test]
    fn test_analyze_dry_room_is_low_risk() {
        let report = analyze(&constant_table(6, 18.0, 45.0), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.risk.risk_tier, RiskTier::Low);
        assert_eq!(report.temperature.level, ConditionLevel::Good);
        assert_eq!(report.humidity.level, ConditionLevel::Good);
        assert_eq!(report.series.len(), 6);
        assert!(report.skipped_rows.is_empty());
    }

    #[test]
    fn test_analyze_reports_missing_columns() {
        let table = RawTable::from_rows(&["when", "value"], vec![vec![CellValue::Integer(1)]]);
        let err = analyze(&table, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, MouldError::MissingColumns(_)));
    }

    #[test]
    fn test_report_summary_mentions_tier() {
        let report = analyze(&constant_table(6, 28.0, 90.0), &AnalysisConfig::default()).unwrap();
        let text = report.to_string();
        assert!(text.contains("Risk level:"));
        assert!(text.contains("High Humidity Risk"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = analyze(&constant_table(3, 22.0, 65.0), &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["risk"]["risk_tier"], "Low");
        assert_eq!(json["humidity"]["level"], "warning");
        assert_eq!(json["series"][0]["timestamp"], "2025-01-01 00:00");
        assert!(json["timeframe"].as_str().unwrap().starts_with("Last 1 days"));
    }
}
