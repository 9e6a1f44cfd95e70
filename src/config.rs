use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Risk thresholds
// ---------------------------------------------------------------------------

/// Index-percentage boundaries between risk tiers.
///
/// `index < low_upper` is Low, `low_upper <= index < moderate_upper` is
/// Moderate, anything above is High.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low_upper: f64,
    pub moderate_upper: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_upper: 16.7,
            moderate_upper: 30.0,
        }
    }
}

impl RiskThresholds {
    /// Both bounds finite and ordered, so every index maps to exactly one tier.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.low_upper.is_finite() && self.moderate_upper.is_finite(),
            "risk thresholds must be finite (low_upper {}, moderate_upper {})",
            self.low_upper,
            self.moderate_upper
        );
        ensure!(
            self.low_upper <= self.moderate_upper,
            "low_upper {} exceeds moderate_upper {}",
            self.low_upper,
            self.moderate_upper
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Caller-facing knobs for one analysis run.
///
/// Loaded from JSON, every field optional:
///
/// ```json
/// { "rolling_window_days": 7, "thresholds": { "moderate_upper": 30.0 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Preferred rolling window in days. Never extends past the data's own span.
    pub rolling_window_days: Option<u32>,
    pub thresholds: RiskThresholds,
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("parsing analysis config")?;
        config.thresholds.validate()?;
        Ok(config)
    }

    /// Replace the preferred window, e.g. from a command-line flag.
    pub fn with_window(mut self, days: Option<u32>) -> Self {
        if days.is_some() {
            self.rolling_window_days = days;
        }
        self
    }
}
