//! Augmented Dickey–Fuller unit-root test with a constant term.
//!
//! The regression is
//!
//! ```text
//! Δx_t = c + γ x_{t-1} + Σ_{j=1..p} δ_j Δx_{t-j} + e_t
//! ```
//!
//! and the test statistic is the t-value of `γ`. The lag order `p` is either
//! fixed or chosen by information criterion over `0..=max_lag` on a common
//! sample, after which the regression is refitted on the sample trimmed for
//! the chosen lag only.
//!
//! p-values use MacKinnon's (1994) response-surface regression and critical
//! values MacKinnon's (2010) finite-sample coefficients, both for the
//! single-series constant-only case.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::error::{PairsError, Result};
use crate::stats::{ols, OlsFit};

/// Fewest observations the test accepts.
pub const MIN_OBSERVATIONS: usize = 6;

// MacKinnon (1994), N = 1, constant.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010), N = 1, constant: b0 + b1/T + b2/T^2 + b3/T^3.
const CRIT_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// How the number of lagged differences is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagSelection {
    /// Minimum Akaike information criterion.
    #[default]
    Aic,
    /// Minimum Bayesian information criterion.
    Bic,
    /// Use `max_lag` as given.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdfOptions {
    /// Upper bound on lagged differences. `None` uses Schwert's rule
    /// `ceil(12 (n/100)^(1/4))`, capped so the regression stays identified.
    pub max_lag: Option<usize>,
    pub lag_selection: LagSelection,
}

impl AdfOptions {
    pub fn fixed(lags: usize) -> Self {
        Self {
            max_lag: Some(lags),
            lag_selection: LagSelection::Fixed,
        }
    }
}

/// Critical values of the test statistic at the usual significance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) critical values for a regression with `nobs` rows.
    pub fn for_nobs(nobs: usize) -> Self {
        let surface = |b: &[f64; 4]| {
            let inv = 1.0 / nobs as f64;
            b[0] + b[1] * inv + b[2] * inv * inv + b[3] * inv * inv * inv
        };
        Self {
            one_pct: surface(&CRIT_1),
            five_pct: surface(&CRIT_5),
            ten_pct: surface(&CRIT_10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    #[serde(with = "crate::nan_serde")]
    pub statistic: f64,
    #[serde(with = "crate::nan_serde")]
    pub p_value: f64,
    /// Lagged differences in the final regression.
    pub used_lag: usize,
    /// Rows in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
    /// Best information criterion value; `None` for a fixed lag.
    pub icbest: Option<f64>,
}

impl AdfResult {
    /// True when the unit-root null is rejected at `alpha`.
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run the ADF test on `series`.
pub fn adf_test(series: &[f64], options: AdfOptions) -> Result<AdfResult> {
    let n = series.len();
    if n < MIN_OBSERVATIONS {
        return Err(PairsError::invalid(format!(
            "ADF test needs at least {MIN_OBSERVATIONS} observations, got {n}"
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(PairsError::invalid("ADF input contains non-finite values"));
    }

    let lag_cap = n / 2 - 2;
    let max_lag = match options.max_lag {
        Some(lag) if lag > lag_cap => {
            return Err(PairsError::invalid(format!(
                "max_lag {lag} too large for {n} observations (limit {lag_cap})"
            )))
        }
        Some(lag) => lag,
        None => schwert_max_lag(n).min(lag_cap),
    };

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, icbest) = match options.lag_selection {
        LagSelection::Fixed => (max_lag, None),
        LagSelection::Aic | LagSelection::Bic => {
            let rows = diffs.len() - max_lag;
            let mut best: Option<(f64, usize)> = None;
            for lags in 0..=max_lag {
                let fit = fit_adf(series, &diffs, lags, rows)?;
                let ic = match options.lag_selection {
                    LagSelection::Bic => bic(&fit),
                    _ => fit.aic(),
                };
                // strict comparison keeps the smaller lag on ties
                if best.map_or(true, |(b, _)| ic < b) {
                    best = Some((ic, lags));
                }
            }
            let (ic, lags) = best.unwrap_or((f64::NAN, 0));
            (lags, Some(ic))
        }
    };

    let rows = diffs.len() - used_lag;
    let fit = fit_adf(series, &diffs, used_lag, rows)?;
    let statistic = fit.t_value(1);

    debug!(n, max_lag, used_lag, nobs = rows, statistic, "ADF regression");

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs: rows,
        critical_values: CriticalValues::for_nobs(rows),
        icbest,
    })
}

/// MacKinnon (1994) approximate p-value for an ADF statistic
/// (one series, constant term).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    Normal::new(0.0, 1.0).map(|d| d.cdf(z)).unwrap_or(f64::NAN)
}

fn schwert_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

fn bic(fit: &OlsFit) -> f64 {
    -2.0 * fit.log_likelihood() + (fit.nobs as f64).ln() * fit.k() as f64
}

/// Fit the ADF regression with `lags` lagged differences on the last `rows`
/// differences. Column order: constant, lagged level, lagged differences.
fn fit_adf(levels: &[f64], diffs: &[f64], lags: usize, rows: usize) -> Result<OlsFit> {
    let k = 2 + lags;
    let first = diffs.len() - rows;
    let mut design = Vec::with_capacity(rows * k);
    for t in first..diffs.len() {
        design.push(1.0);
        design.push(levels[t]);
        for j in 1..=lags {
            design.push(diffs[t - j]);
        }
    }
    ols(&diffs[first..], &design, k)
}
