//! Write a synthetic logger export for trying out the analysis.
//!
//! `generate_sample [output.csv] [days]` produces hourly readings with a
//! daily temperature cycle and a damp spell in the middle of the period,
//! under headers the way a consumer sensor app exports them.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "sample_readings.csv".to_string());
    let days: i64 = match args.next() {
        Some(d) => d.parse().with_context(|| format!("invalid day count '{d}'"))?,
        None => 14,
    };

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["Local Date/Time", "Temp(°C)", "RH (%)"])?;

    let hours = days * 24;
    let damp_start = hours / 3;
    let damp_end = 2 * hours / 3;
    for h in 0..hours {
        let hour_of_day = (h % 24) as f64;
        let cycle = (2.0 * std::f64::consts::PI * (hour_of_day - 15.0) / 24.0).cos();
        let temperature = 19.0 + 3.0 * cycle + rng.gauss(0.0, 0.3);

        let base_rh = if (damp_start..damp_end).contains(&h) { 88.0 } else { 62.0 };
        let humidity = (base_rh - 4.0 * cycle + rng.gauss(0.0, 1.5)).clamp(0.0, 100.0);

        let timestamp = start + Duration::hours(h);
        writer.write_record([
            timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{temperature:.1}"),
            format!("{humidity:.1}"),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {hours} hourly readings ({days} days) to {output_path}");
    Ok(())
}
