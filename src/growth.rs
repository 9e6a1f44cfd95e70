//! Mould growth physics: the critical-humidity threshold and the per-step
//! rate of change of the mould index.
//!
//! ```text
//!            ┌ 80 - 0.5·(20 - T)   T ≤ 20 °C
//! RH_crit = ─┤
//!            └ 80                  T > 20 °C
//!
//! growth   (RH ≥ RH_crit):  dM = k1 · max(1 - e^(2.3·(M-6)), 0)
//! decay    (RH <  RH_crit):  dM = -0.001·|RH - RH_crit|   (deficit < 10)
//!                           dM = -0.0005                  (deficit ≥ 10)
//! ```
//!
//! Rates are per 24 h and scaled by the actual sample interval.

/// Upper bound of the mould index.
pub const MAX_INDEX: f64 = 6.0;

/// Critical RH above 20 °C, and the pivot temperature below which it rises.
pub const BASE_RH_CRIT: f64 = 80.0;
pub const PIVOT_TEMPERATURE: f64 = 20.0;
const RH_CRIT_SLOPE: f64 = 0.5;

/// Growth coefficient while the index is below 1, and once established.
pub const K1_INITIAL: f64 = 0.22;
pub const K1_ESTABLISHED: f64 = 0.33;
const SATURATION_EXPONENT: f64 = 2.3;

const DECAY_PER_POINT: f64 = 0.001;
/// Deficits at or beyond this many RH points decay at the floor rate.
const DECAY_FLOOR_DEFICIT: f64 = 10.0;
const DECAY_FLOOR: f64 = -0.0005;

const RATE_PERIOD_HOURS: f64 = 24.0;

/// Critical relative humidity (%) for a given temperature (°C).
///
/// Total: a non-finite temperature yields the 80 % default.
pub fn rh_crit(temperature: f64) -> f64 {
    if !temperature.is_finite() {
        return BASE_RH_CRIT;
    }
    if temperature <= PIVOT_TEMPERATURE {
        BASE_RH_CRIT - RH_CRIT_SLOPE * (PIVOT_TEMPERATURE - temperature)
    } else {
        BASE_RH_CRIT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Growth,
    Decay,
}

pub fn regime(humidity: f64, rh_crit: f64) -> Regime {
    if humidity >= rh_crit {
        Regime::Growth
    } else {
        Regime::Decay
    }
}

/// Unscaled rate of change of the index over one 24 h period.
fn daily_rate(humidity: f64, rh_crit: f64, index: f64) -> f64 {
    if humidity <= 0.0 {
        return 0.0;
    }
    match regime(humidity, rh_crit) {
        Regime::Growth => {
            let k1 = if index < 1.0 { K1_INITIAL } else { K1_ESTABLISHED };
            let k2 = (1.0 - (SATURATION_EXPONENT * (index - MAX_INDEX)).exp()).max(0.0);
            k1 * k2
        }
        Regime::Decay => {
            let diff = humidity - rh_crit;
            if diff > -DECAY_FLOOR_DEFICIT {
                -DECAY_PER_POINT * diff.abs()
            } else {
                DECAY_FLOOR
            }
        }
    }
}

/// Change in mould index over `dt_hours`, given windowed humidity, its
/// critical threshold and the current index. Never NaN or infinite.
pub fn growth_rate(humidity: f64, rh_crit: f64, index: f64, dt_hours: f64) -> f64 {
    if !(humidity.is_finite() && rh_crit.is_finite() && index.is_finite()) {
        return 0.0;
    }
    let scaled = daily_rate(humidity, rh_crit, index) * (dt_hours / RATE_PERIOD_HOURS);
    if scaled.is_finite() {
        scaled
    } else {
        0.0
    }
}
