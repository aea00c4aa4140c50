//! Performance evaluator: pure functions over a daily return series.
//!
//! Undefined (NaN) daily returns count as zero in the cumulative curve and
//! are skipped by the moments.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;
use crate::error::{ensure_non_empty, Result};
use crate::stats::{mean, sample_std};

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Risk and return summary of one daily return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    #[serde(with = "crate::nan_serde")]
    pub mean_daily_return: f64,
    #[serde(with = "crate::nan_serde")]
    pub std_daily_return: f64,
    /// NaN when the std is zero or undefined.
    #[serde(with = "crate::nan_serde")]
    pub annualized_sharpe: f64,
    /// Largest peak-to-trough decline as a positive fraction.
    #[serde(with = "crate::nan_serde")]
    pub max_drawdown: f64,
    /// Final cumulative growth minus one.
    #[serde(with = "crate::nan_serde")]
    pub total_return: f64,
    /// Number of defined daily returns.
    pub observations: usize,
}

/// Evaluate a daily return series. Fails only on empty input.
pub fn evaluate(daily_returns: &[f64]) -> Result<PerformanceSummary> {
    ensure_non_empty("daily return series", daily_returns.len())?;

    let mean_daily_return = mean(daily_returns);
    let std_daily_return = sample_std(daily_returns);
    let curve = cumulative_returns(daily_returns);

    Ok(PerformanceSummary {
        mean_daily_return,
        std_daily_return,
        annualized_sharpe: annualized_sharpe(mean_daily_return, std_daily_return),
        max_drawdown: max_drawdown(&curve),
        total_return: curve.last().map_or(0.0, |c| c - 1.0),
        observations: daily_returns.iter().filter(|r| !r.is_nan()).count(),
    })
}

/// Running product of `1 + r`, with NaN entries treated as zero.
pub fn cumulative_returns(daily_returns: &[f64]) -> Vec<f64> {
    daily_returns
        .iter()
        .scan(1.0, |acc, &r| {
            *acc *= 1.0 + if r.is_nan() { 0.0 } else { r };
            Some(*acc)
        })
        .collect()
}

/// `mean / std * sqrt(252)`; NaN when the std is zero or undefined.
pub fn annualized_sharpe(mean: f64, std: f64) -> f64 {
    if std == 0.0 || std.is_nan() {
        return f64::NAN;
    }
    mean / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Maximum of `(running_max - curve) / running_max`.
///
/// Zero for a curve that never falls below its running maximum.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in curve {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }
    worst
}

/// Fraction of closed or open trades with a positive return.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}
