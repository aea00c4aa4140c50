//! Computation errors shared by the statistical and backtesting stages.

use thiserror::Error;

/// Errors from the spread, stationarity, signal, simulation, and metric stages.
///
/// Numerically degenerate outcomes (zero volatility, no drawdown) are not
/// errors; they surface as NaN or zero values in the results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("regression failed: {0}")]
    Regression(String),
}

pub type Result<T> = std::result::Result<T, PairsError>;

impl PairsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Fail with `InvalidInput` unless both sequences have the same length.
pub(crate) fn ensure_same_len(name_a: &str, a: usize, name_b: &str, b: usize) -> Result<()> {
    if a != b {
        return Err(PairsError::invalid(format!(
            "length mismatch: {name_a} has {a} values, {name_b} has {b}"
        )));
    }
    Ok(())
}

/// Fail with `InvalidInput` if the sequence is empty.
pub(crate) fn ensure_non_empty(name: &str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(PairsError::invalid(format!("{name} is empty")));
    }
    Ok(())
}
