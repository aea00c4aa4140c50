//! Per-leg and per-strategy daily returns.

use crate::domain::Signal;
use crate::error::{ensure_same_len, Result};

/// Percentage change of a close series.
///
/// Element 0 is NaN (no prior close), as is any change touching a NaN close.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        let (prev, cur) = (closes[i - 1], closes[i]);
        if prev.is_nan() || cur.is_nan() {
            continue;
        }
        result[i] = cur / prev - 1.0;
    }
    result
}

/// Dollar-neutral strategy return: `direction * (return_a - return_b)`.
///
/// NaN wherever a leg return is undefined, flat or not, so the first date is
/// always NaN. Otherwise exactly 0 on flat dates.
pub fn strategy_returns(executed: &[Signal], return_a: &[f64], return_b: &[f64]) -> Result<Vec<f64>> {
    ensure_same_len("executed signals", executed.len(), "return_a", return_a.len())?;
    ensure_same_len("executed signals", executed.len(), "return_b", return_b.len())?;
    Ok(executed
        .iter()
        .zip(return_a.iter().zip(return_b))
        .map(|(signal, (a, b))| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else if signal.is_flat() {
                0.0
            } else {
                signal.direction() * (a - b)
            }
        })
        .collect())
}
