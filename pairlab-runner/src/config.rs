//! Pair backtest configuration, parsed from TOML.
//!
//! ```toml
//! [pair]
//! symbol_a = "KO"
//! symbol_b = "PEP"
//! start_date = "2018-01-01"
//! end_date = "2023-01-01"
//!
//! [strategy]
//! window = 10
//! threshold = 1.5
//! stop_loss_threshold = -0.02
//! ```
//!
//! The `[strategy]` section and each of its keys are optional.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Validation(String),
}

/// The two instruments and the date range to study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSection {
    pub symbol_a: String,
    pub symbol_b: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Band and risk parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySection {
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Cumulative trade return below which the trade is closed.
    #[serde(default = "default_stop_loss")]
    pub stop_loss_threshold: f64,
}

fn default_window() -> usize {
    10
}

fn default_threshold() -> f64 {
    1.5
}

fn default_stop_loss() -> f64 {
    -0.02
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            window: default_window(),
            threshold: default_threshold(),
            stop_loss_threshold: default_stop_loss(),
        }
    }
}

/// Command-line values that replace the corresponding config entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub window: Option<usize>,
    pub threshold: Option<f64>,
    pub stop_loss_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairConfig {
    pub pair: PairSection,
    #[serde(default)]
    pub strategy: StrategySection,
}

impl PairConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: PairConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Replace every entry the overrides set, then validate the result.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(start) = overrides.start_date {
            self.pair.start_date = start;
        }
        if let Some(end) = overrides.end_date {
            self.pair.end_date = end;
        }
        if let Some(window) = overrides.window {
            self.strategy.window = window;
        }
        if let Some(threshold) = overrides.threshold {
            self.strategy.threshold = threshold;
        }
        if let Some(stop_loss) = overrides.stop_loss_threshold {
            self.strategy.stop_loss_threshold = stop_loss;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));
        let p = &self.pair;
        let s = &self.strategy;

        if p.symbol_a.trim().is_empty() || p.symbol_b.trim().is_empty() {
            return invalid("symbols must not be empty".into());
        }
        if p.symbol_a.eq_ignore_ascii_case(&p.symbol_b) {
            return invalid(format!("symbol_a and symbol_b are both '{}'", p.symbol_a));
        }
        if p.start_date >= p.end_date {
            return invalid(format!(
                "start_date {} must be before end_date {}",
                p.start_date, p.end_date
            ));
        }
        if s.window == 0 {
            return invalid("window must be at least 1".into());
        }
        if !(s.threshold.is_finite() && s.threshold > 0.0) {
            return invalid(format!("threshold must be positive, got {}", s.threshold));
        }
        if !(s.stop_loss_threshold.is_finite()
            && s.stop_loss_threshold < 0.0
            && s.stop_loss_threshold > -1.0)
        {
            return invalid(format!(
                "stop_loss_threshold must lie in (-1, 0), got {}",
                s.stop_loss_threshold
            ));
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    pub fn run_id(&self) -> String {
        // Serializing plain strings, dates, and numbers cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Label used for artifact directories, e.g. `KO_PEP`.
    pub fn pair_label(&self) -> String {
        format!("{}_{}", self.pair.symbol_a, self.pair.symbol_b)
    }
}
