//! Small numerical helpers: moments and ordinary least squares.
//!
//! OLS is solved through the normal equations with `nalgebra`. The designs
//! used here are tiny (a constant, a level, and a handful of lags), so the
//! conditioning of `X'X` is not a concern beyond detecting exact singularity.

use nalgebra::{DMatrix, DVector};

use crate::error::{PairsError, Result};

/// Arithmetic mean of the finite values; NaN when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Sample standard deviation (n - 1 denominator) of the finite values.
///
/// NaN with fewer than two finite values.
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return f64::NAN;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let var = finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    var.sqrt()
}

/// Fitted OLS model.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Number of estimated parameters.
    pub fn k(&self) -> usize {
        self.coefficients.len()
    }

    /// Gaussian log-likelihood at the MLE of the error variance.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion: `-2 llf + 2 k`.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.k() as f64
    }

    /// Coefficient of determination for a model with an intercept.
    pub fn r_squared(&self, y: &[f64]) -> f64 {
        let m = mean(y);
        let tss: f64 = y.iter().map(|v| (v - m).powi(2)).sum();
        if tss == 0.0 {
            return f64::NAN;
        }
        1.0 - self.ssr / tss
    }
}

/// Regress `y` on the columns of `x` (row-major, `y.len()` rows, `k` columns).
///
/// The caller supplies any constant column. Fails when the design has no
/// residual degrees of freedom or `X'X` is singular.
pub fn ols(y: &[f64], x_rows: &[f64], k: usize) -> Result<OlsFit> {
    let n = y.len();
    if k == 0 || x_rows.len() != n * k {
        return Err(PairsError::invalid(format!(
            "design matrix has {} cells, expected {n} x {k}",
            x_rows.len()
        )));
    }
    if n <= k {
        return Err(PairsError::invalid(format!(
            "{n} observations cannot identify {k} parameters"
        )));
    }
    if y.iter().chain(x_rows.iter()).any(|v| !v.is_finite()) {
        return Err(PairsError::invalid("regression inputs must be finite"));
    }

    let x = DMatrix::from_row_slice(n, k, x_rows);
    let y_vec = DVector::from_column_slice(y);

    let xt = x.transpose();
    let xtx_inv = (&xt * &x)
        .try_inverse()
        .ok_or_else(|| PairsError::Regression("singular design matrix".into()))?;
    let beta = &xtx_inv * (&xt * &y_vec);

    let residuals = &y_vec - &x * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;

    let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).sqrt()).collect();

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        residuals: residuals.iter().copied().collect(),
        ssr,
        nobs: n,
    })
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
