//! Spread model: OLS hedge of instrument A on instrument B.
//!
//! `A_t = intercept + hedge_ratio * B_t + spread_t`. The residual series is the
//! spread that the signal generator trades.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_same_len, PairsError, Result};
use crate::stats::{mean, ols};

/// Minimum number of aligned observations needed to fit the hedge.
pub const MIN_OBSERVATIONS: usize = 3;

/// Fitted linear relationship between the two legs plus its residuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadModel {
    pub intercept: f64,
    pub hedge_ratio: f64,
    #[serde(with = "crate::nan_serde")]
    pub r_squared: f64,
    /// One residual per aligned date.
    pub residuals: Vec<f64>,
}

impl SpreadModel {
    /// Spread value implied by the fitted coefficients for a new price pair.
    pub fn spread_at(&self, price_a: f64, price_b: f64) -> f64 {
        price_a - (self.intercept + self.hedge_ratio * price_b)
    }

    /// Mean-reversion half-life of the spread in observations.
    ///
    /// Fits `Δs_t = c + φ (s_{t-1} - mean(s)) + e_t` and returns `-ln 2 / ln(1 + φ)`.
    /// `None` when the spread is not mean-reverting (`φ` outside `(-1, 0)`) or the
    /// regression cannot be fitted.
    pub fn half_life(&self) -> Option<f64> {
        let s = &self.residuals;
        if s.len() < 10 {
            return None;
        }
        let m = mean(s);
        let dy: Vec<f64> = s.windows(2).map(|w| w[1] - w[0]).collect();
        let design: Vec<f64> = s[..s.len() - 1].iter().flat_map(|&v| [1.0, v - m]).collect();
        let fit = ols(&dy, &design, 2).ok()?;
        let phi = fit.coefficients[1];
        if phi >= 0.0 || phi <= -1.0 {
            return None;
        }
        Some(-(2.0_f64.ln()) / (1.0 + phi).ln())
    }
}

/// Regress `prices_a` on a constant and `prices_b`.
///
/// Fails with `InvalidInput` on mismatched or too-short input and with
/// `Regression` when `prices_b` is constant.
pub fn fit_spread(prices_a: &[f64], prices_b: &[f64]) -> Result<SpreadModel> {
    ensure_same_len("prices_a", prices_a.len(), "prices_b", prices_b.len())?;
    if prices_a.len() < MIN_OBSERVATIONS {
        return Err(PairsError::invalid(format!(
            "spread model needs at least {MIN_OBSERVATIONS} observations, got {}",
            prices_a.len()
        )));
    }

    let design: Vec<f64> = prices_b.iter().flat_map(|&b| [1.0, b]).collect();
    let fit = ols(prices_a, &design, 2)?;

    let model = SpreadModel {
        intercept: fit.coefficients[0],
        hedge_ratio: fit.coefficients[1],
        r_squared: fit.r_squared(prices_a),
        residuals: fit.residuals,
    };
    debug!(
        intercept = model.intercept,
        hedge_ratio = model.hedge_ratio,
        r_squared = model.r_squared,
        n = prices_a.len(),
        "fitted spread model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::assert_approx;

    fn noise(i: usize) -> f64 {
        ((i * 7919) % 1000) as f64 / 5000.0 - 0.1
    }

    #[test]
    fn recovers_hedge_and_intercept() {
        let b: Vec<f64> = (0..200).map(|i| 50.0 + i as f64 * 0.1 + noise(i)).collect();
        let a: Vec<f64> = b
            .iter()
            .enumerate()
            .map(|(i, &x)| 3.0 + 2.0 * x + noise(i * 31 + 7) * 0.1)
            .collect();
        let model = fit_spread(&a, &b).unwrap();
        assert_approx(model.hedge_ratio, 2.0, 0.05);
        assert_approx(model.intercept, 3.0, 1.0);
        assert_eq!(model.residuals.len(), a.len());
        assert!(model.r_squared > 0.99);
    }

    #[test]
    fn residuals_sum_to_zero_with_intercept() {
        let b = [1.0, 2.0, 4.0, 7.0, 11.0];
        let a = [2.0, 2.5, 5.0, 6.0, 12.0];
        let model = fit_spread(&a, &b).unwrap();
        let total: f64 = model.residuals.iter().sum();
        assert_approx(total, 0.0, 1e-9);
        for i in 0..a.len() {
            assert_approx(model.spread_at(a[i], b[i]), model.residuals[i], 1e-9);
        }
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = fit_spread(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PairsError::InvalidInput(_)));
    }

    #[test]
    fn constant_regressor_is_regression_error() {
        let err = fit_spread(&[1.0, 2.0, 3.0, 4.0], &[5.0; 4]).unwrap_err();
        assert!(matches!(err, PairsError::Regression(_)));
    }

    #[test]
    fn half_life_of_ar1_spread() {
        // s_t = 0.5 s_{t-1} + e_t  →  φ ≈ -0.5, half-life ≈ 1
        let mut s = vec![1.0];
        for i in 1..500 {
            s.push(0.5 * s[i - 1] + noise(i));
        }
        let model = SpreadModel {
            intercept: 0.0,
            hedge_ratio: 1.0,
            r_squared: 0.0,
            residuals: s,
        };
        let hl = model.half_life().unwrap();
        assert!(hl > 0.5 && hl < 2.0, "half-life {hl}");
    }

    #[test]
    fn trending_spread_has_no_half_life() {
        let model = SpreadModel {
            intercept: 0.0,
            hedge_ratio: 1.0,
            r_squared: 0.0,
            residuals: (0..50).map(|i| (i as f64).powi(2)).collect(),
        };
        assert!(model.half_life().is_none());
    }
}
