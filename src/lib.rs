//! Mould growth index from irregularly sampled temperature / humidity exports.
//!
//! ```text
//!  RawTable ─▶ columns ─▶ normalize ─▶ simulation (rh_crit, growth_rate) ─▶ risk
//! ```
//!
//! Every call is a self-contained computation over one dataset; nothing is
//! cached between calls.

pub mod config;
pub mod data;
pub mod error;
pub mod growth;
pub mod report;
pub mod risk;
pub mod simulation;

pub use config::{AnalysisConfig, RiskThresholds};
pub use data::loader::load_file;
pub use data::model::{CellValue, RawTable, Reading};
pub use error::MouldError;
pub use report::{analyze, AnalysisReport};
pub use risk::{assess_risk, classify, RiskAssessment, RiskTier};
pub use simulation::{run_simulation, simulate, SimulationOutcome, SimulationReport};
