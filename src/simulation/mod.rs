/// Mould index simulation over a normalized reading sequence.
///
/// ```text
///  Vec<Reading> (sorted)
///        │  median interval, window length, cutoff
///        ▼
///   ┌──────────────┐   per row: push → window mean → rh_crit → growth_rate
///   │ SimulationState│ ─────────────────────────────────────────────────▶ index ∈ [0, 6]
///   └──────────────┘
///        │  IndexSample per row, then trailing smoothing
///        ▼
///  SimulationOutcome { index %, series, timeframe, skipped rows }
/// ```
pub mod series;
pub mod window;

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::data::model::{RawTable, Reading};
use crate::data::normalize::standardize;
use crate::error::MouldError;
use crate::growth::{growth_rate, rh_crit, MAX_INDEX};

use self::series::{median_interval_minutes, round2, smooth, IndexSample, SMOOTHING_WINDOW};
use self::window::RollingWindow;

/// Mould index every run starts from.
pub const INITIAL_INDEX: f64 = 0.1;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MINUTES_PER_DAY: f64 = 1_440.0;

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Which slice of the data the simulation actually ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    EntireDataset { start: NaiveDate, end: NaiveDate },
    LastDays { days: u32, start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::EntireDataset { start, end } => {
                write!(f, "Entire dataset ({start} to {end})")
            }
            Timeframe::LastDays { days, start, end } => {
                write!(f, "Last {days} days ({start} to {end})")
            }
        }
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Why a single row was left out of the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum RowIssue {
    #[error("non-finite temperature or humidity")]
    NonFiniteReading,
    #[error("invalid time step")]
    InvalidTimeStep,
    #[error("window average is not finite")]
    NonFiniteAverage,
}

/// A row the simulator skipped, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkippedRow {
    /// Position within the simulated slice.
    pub position: usize,
    pub timestamp: NaiveDateTime,
    pub reason: RowIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Final index as a percentage of [`MAX_INDEX`], in `[0, 100]`.
    pub index_percentage: f64,
    pub series: Vec<IndexSample>,
    pub timeframe: Timeframe,
    /// The full normalized dataset, not only the simulated slice.
    pub readings: Vec<Reading>,
    pub skipped: Vec<SkippedRow>,
    pub interval_minutes: f64,
    pub window_days: u32,
    pub window_capacity: usize,
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Mutable state of one run: the index and the rolling window feeding it.
#[derive(Debug, Clone)]
pub struct SimulationState {
    index: f64,
    window: RollingWindow,
}

impl SimulationState {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            index: INITIAL_INDEX,
            window: RollingWindow::new(window_capacity),
        }
    }

    pub fn index(&self) -> f64 {
        self.index
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// Feed one reading `dt_hours` after the previous one and return the new index.
    ///
    /// On error the state is left as it was before the call.
    pub fn step(&mut self, reading: &Reading, dt_hours: f64) -> Result<f64, RowIssue> {
        if !(reading.humidity.is_finite() && reading.temperature.is_finite()) {
            return Err(RowIssue::NonFiniteReading);
        }
        if !dt_hours.is_finite() || dt_hours < 0.0 {
            return Err(RowIssue::InvalidTimeStep);
        }

        let (avg_rh, avg_temp) = self
            .window
            .mean_with(reading.humidity, reading.temperature)
            .filter(|(rh, t)| rh.is_finite() && t.is_finite())
            .ok_or(RowIssue::NonFiniteAverage)?;
        self.window.push(reading.humidity, reading.temperature);

        let crit = rh_crit(avg_temp);
        let rate = growth_rate(avg_rh, crit, self.index, dt_hours);
        self.index = (self.index + rate).clamp(0.0, MAX_INDEX);

        debug!(
            "{}: avg RH {avg_rh:.2}, avg T {avg_temp:.2}, RH_crit {crit:.2}, dM {rate:.6}, M {:.4}",
            reading.timestamp, self.index
        );
        Ok(self.index)
    }
}

pub fn to_percentage(index: f64) -> f64 {
    index / MAX_INDEX * 100.0
}

// ---------------------------------------------------------------------------
// Window sizing
// ---------------------------------------------------------------------------

/// Days spanned by the data, rounded up, at least one; a preferred window
/// may shorten it but never lengthen it.
pub fn window_days(readings: &[Reading], preferred: Option<u32>) -> u32 {
    let span_days = match (readings.first(), readings.last()) {
        (Some(first), Some(last)) => {
            let span_secs = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
            (span_secs / SECONDS_PER_DAY).ceil().max(1.0) as u32
        }
        _ => 1,
    };
    match preferred {
        Some(days) => days.max(1).min(span_days),
        None => span_days,
    }
}

/// Number of samples `days` worth of data holds at the given interval.
pub fn window_capacity(days: u32, interval_minutes: f64) -> usize {
    let points = (days as f64 * (MINUTES_PER_DAY / interval_minutes)).floor();
    if points.is_finite() && points >= 1.0 {
        points as usize
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Run the simulation over already-normalized, time-sorted readings.
pub fn simulate_readings(
    readings: Vec<Reading>,
    preferred_window_days: Option<u32>,
) -> Result<SimulationOutcome, MouldError> {
    let (Some(first), Some(last)) = (readings.first(), readings.last()) else {
        return Err(MouldError::EmptyDataset);
    };
    let (first_ts, latest) = (first.timestamp, last.timestamp);

    let interval_minutes = median_interval_minutes(&readings);
    let days = window_days(&readings, preferred_window_days);
    let capacity = window_capacity(days, interval_minutes);
    info!(
        "Median interval {interval_minutes:.2} min, rolling window {days} days, capacity {capacity} points"
    );

    // A cutoff before the earliest representable instant keeps every row.
    let start = latest
        .checked_sub_signed(Duration::days(days as i64))
        .map(|cutoff| readings.partition_point(|r| r.timestamp < cutoff))
        .unwrap_or(readings.len());
    let (slice, timeframe) = if start < readings.len() {
        let slice = &readings[start..];
        let timeframe = Timeframe::LastDays {
            days,
            start: slice[0].timestamp.date(),
            end: latest.date(),
        };
        (slice, timeframe)
    } else {
        let timeframe = Timeframe::EntireDataset {
            start: first_ts.date(),
            end: latest.date(),
        };
        (&readings[..], timeframe)
    };

    let mut state = SimulationState::new(capacity);
    let mut series = Vec::with_capacity(slice.len());
    let mut skipped = Vec::new();
    let mut previous: Option<NaiveDateTime> = None;

    for (position, reading) in slice.iter().enumerate() {
        let dt_hours = match previous {
            Some(prev) => (reading.timestamp - prev).num_milliseconds() as f64 / 3_600_000.0,
            None => interval_minutes / 60.0,
        };
        previous = Some(reading.timestamp);

        match state.step(reading, dt_hours) {
            Ok(index) => series.push(IndexSample {
                timestamp: reading.timestamp,
                index_value: round2(to_percentage(index)),
            }),
            Err(reason) => {
                warn!("Skipping row {position} at {}: {reason}", reading.timestamp);
                skipped.push(SkippedRow {
                    position,
                    timestamp: reading.timestamp,
                    reason,
                });
            }
        }
    }

    smooth(&mut series, SMOOTHING_WINDOW);

    let index_percentage = to_percentage(state.index());
    info!("Final mould index {index_percentage:.2}% over {timeframe}");

    Ok(SimulationOutcome {
        index_percentage,
        series,
        timeframe,
        readings,
        skipped,
        interval_minutes,
        window_days: days,
        window_capacity: capacity,
    })
}

/// Resolve, normalize and simulate a raw table.
pub fn simulate(
    table: &RawTable,
    preferred_window_days: Option<u32>,
) -> Result<SimulationOutcome, MouldError> {
    let readings = standardize(table)?;
    simulate_readings(readings, preferred_window_days)
}

// ---------------------------------------------------------------------------
// Lenient report
// ---------------------------------------------------------------------------

/// Caller-facing result that never fails: structural errors become an
/// absent index, an empty series and a `failure` reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub index_percentage: Option<f64>,
    pub series: Vec<IndexSample>,
    pub timeframe: String,
    pub readings: Vec<Reading>,
    pub skipped: Vec<SkippedRow>,
    pub failure: Option<String>,
}

impl From<Result<SimulationOutcome, MouldError>> for SimulationReport {
    fn from(result: Result<SimulationOutcome, MouldError>) -> Self {
        match result {
            Ok(outcome) => SimulationReport {
                index_percentage: Some(outcome.index_percentage),
                series: outcome.series,
                timeframe: outcome.timeframe.to_string(),
                readings: outcome.readings,
                skipped: outcome.skipped,
                failure: None,
            },
            Err(err) => SimulationReport {
                index_percentage: None,
                series: Vec::new(),
                timeframe: "No data".to_string(),
                readings: Vec::new(),
                skipped: Vec::new(),
                failure: Some(err.to_string()),
            },
        }
    }
}

pub fn run_simulation(table: &RawTable, preferred_window_days: Option<u32>) -> SimulationReport {
    let result = simulate(table, preferred_window_days);
    if let Err(err) = &result {
        warn!("Mould index simulation failed: {err}");
    }
    result.into()
}
