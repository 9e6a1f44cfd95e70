use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::data::model::Reading;

/// Interval assumed when the data cannot tell us one.
pub const DEFAULT_INTERVAL_MINUTES: f64 = 60.0;

/// Trailing window of the output smoothing pass.
pub const SMOOTHING_WINDOW: usize = 5;

/// One point of the output series, as a percentage of the maximum index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexSample {
    #[serde(serialize_with = "serialize_minute")]
    pub timestamp: NaiveDateTime,
    pub index_value: f64,
}

fn serialize_minute<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format("%Y-%m-%d %H:%M"))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Median gap between consecutive readings, in minutes.
///
/// Falls back to [`DEFAULT_INTERVAL_MINUTES`] for fewer than two readings or
/// a non-positive median (e.g. mostly duplicated timestamps).
pub fn median_interval_minutes(readings: &[Reading]) -> f64 {
    let mut gaps: Vec<f64> = readings
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 60_000.0)
        .collect();
    match median(&mut gaps) {
        Some(m) if m > 0.0 && m.is_finite() => m,
        _ => DEFAULT_INTERVAL_MINUTES,
    }
}

/// Trailing moving average over `window` samples (fewer at the start),
/// rounded to two decimals.
pub fn smooth(samples: &mut [IndexSample], window: usize) {
    let window = window.max(1);
    let mut recent: VecDeque<f64> = VecDeque::with_capacity(window);
    for sample in samples.iter_mut() {
        if recent.len() == window {
            recent.pop_front();
        }
        recent.push_back(sample.index_value);
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        sample.index_value = round2(mean);
    }
}
