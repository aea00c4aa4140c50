//! Signal generator: rolling z-score bands over the spread.
//!
//! Lookback: `window - 1`. Rolling std uses the sample (n - 1) denominator.
//! A window containing NaN produces no stats and therefore a flat signal.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;
use crate::error::{PairsError, Result};

/// Trailing mean and sample standard deviation at one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub mean: f64,
    pub std: f64,
}

impl RollingStats {
    /// Classify `value` against the bands `mean ± threshold * std`.
    ///
    /// Exact equality with a band is flat.
    pub fn classify(&self, value: f64, threshold: f64) -> Signal {
        let lower = self.mean - threshold * self.std;
        let upper = self.mean + threshold * self.std;
        if value < lower {
            Signal::Long
        } else if value > upper {
            Signal::Short
        } else {
            Signal::Flat
        }
    }

    pub fn zscore(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            return f64::NAN;
        }
        (value - self.mean) / self.std
    }
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(PairsError::invalid("window must be positive"));
    }
    Ok(())
}

/// Trailing stats over `[t - window + 1, t]`; `None` while the window is
/// filling, when it holds a NaN, or when the std is undefined.
pub fn rolling_stats(spread: &[f64], window: usize) -> Result<Vec<Option<RollingStats>>> {
    check_window(window)?;
    let n = spread.len();
    let mut result = vec![None; n];
    if n < window || window < 2 {
        return Ok(result);
    }

    for i in (window - 1)..n {
        let slice = &spread[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        let std = var.sqrt();
        if std.is_nan() {
            continue;
        }
        result[i] = Some(RollingStats { mean, std });
    }
    Ok(result)
}

/// Position signal per date from the spread and its rolling bands.
///
/// Flat during warm-up and wherever the stats are undefined.
pub fn generate_signals(spread: &[f64], window: usize, threshold: f64) -> Result<Vec<Signal>> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(PairsError::invalid(format!(
            "threshold must be a positive number, got {threshold}"
        )));
    }
    let stats = rolling_stats(spread, window)?;
    Ok(spread
        .iter()
        .zip(&stats)
        .map(|(&value, stat)| match stat {
            Some(s) if !value.is_nan() => s.classify(value, threshold),
            _ => Signal::Flat,
        })
        .collect())
}

/// One-day execution lag: `executed[t] = signals[t - 1]`, `executed[0] = Flat`.
pub fn execute_signals(signals: &[Signal]) -> Vec<Signal> {
    if signals.is_empty() {
        return Vec::new();
    }
    std::iter::once(Signal::Flat)
        .chain(signals[..signals.len() - 1].iter().copied())
        .collect()
}

/// Rolling z-score of the spread, NaN where undefined.
pub fn zscores(spread: &[f64], window: usize) -> Result<Vec<f64>> {
    let stats = rolling_stats(spread, window)?;
    Ok(spread
        .iter()
        .zip(&stats)
        .map(|(&v, s)| s.map_or(f64::NAN, |s| s.zscore(v)))
        .collect())
}
