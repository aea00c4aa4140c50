//! Pair backtest runner: wires together spread, stationarity, signals,
//! simulation, and evaluation.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads the pair through the cache, then runs. Used by CLI.
//! - `run_pair_backtest()`: takes an already aligned pair. No I/O.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use pairlab_core::data::{AlignedPair, DataError, DataProvider, DataSource, ParquetCache};
use pairlab_core::domain::{Signal, Trade, TradeStatus};
use pairlab_core::engine::{daily_returns, simulate};
use pairlab_core::performance::{cumulative_returns, evaluate, win_rate, PerformanceSummary};
use pairlab_core::signals::{execute_signals, generate_signals, rolling_stats};
use pairlab_core::spread::{fit_spread, SpreadModel};
use pairlab_core::stationarity::{adf_test, AdfOptions, AdfResult};
use pairlab_core::PairsError;

use crate::config::{ConfigError, PairConfig};
use crate::data_loader::{load_pair, LoadError, LoadOptions};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("computation error: {0}")]
    Computation(#[from] PairsError),
    #[error("only {common} common dates between the two legs; at least 2 are needed")]
    InsufficientOverlap { common: usize },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Significance level used when summarising the ADF result.
pub const ADF_ALPHA: f64 = 0.05;

/// Hedge coefficients without the residual vector (that lives in the daily rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSummary {
    pub intercept: f64,
    pub hedge_ratio: f64,
    #[serde(with = "pairlab_core::nan_serde")]
    pub r_squared: f64,
    /// Mean-reversion half-life in trading days.
    pub half_life: Option<f64>,
}

impl From<&SpreadModel> for SpreadSummary {
    fn from(model: &SpreadModel) -> Self {
        Self {
            intercept: model.intercept,
            hedge_ratio: model.hedge_ratio,
            r_squared: model.r_squared,
            half_life: model.half_life(),
        }
    }
}

/// One trade with its dates resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Signal,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub exit_index: Option<usize>,
    pub exit_date: Option<NaiveDate>,
    pub days_held: usize,
    pub cumulative_return: f64,
    pub status: TradeStatus,
}

impl TradeRecord {
    fn from_trade(trade: &Trade, dates: &[NaiveDate]) -> Self {
        Self {
            side: trade.side,
            entry_index: trade.entry_index,
            entry_date: dates[trade.entry_index],
            exit_index: trade.exit_index,
            exit_date: trade.exit_index.map(|i| dates[i]),
            days_held: trade.days_held(dates.len()),
            cumulative_return: trade.cumulative_return,
            status: trade.status,
        }
    }
}

/// Everything computed for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub close_a: f64,
    pub close_b: f64,
    pub spread: f64,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub signal: Signal,
    pub executed: Signal,
    #[serde(with = "pairlab_core::nan_serde")]
    pub return_a: f64,
    #[serde(with = "pairlab_core::nan_serde")]
    pub return_b: f64,
    #[serde(with = "pairlab_core::nan_serde")]
    pub strategy_return: f64,
    #[serde(with = "pairlab_core::nan_serde")]
    pub adjusted_return: f64,
    pub cumulative: f64,
    pub adjusted_cumulative: f64,
}

/// Complete result of one pair backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairBacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: PairConfig,
    pub run_id: String,
    pub symbol_a: String,
    pub symbol_b: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSource>,
    pub spread: SpreadSummary,
    /// `None` when the test could not be run; see `warnings`.
    pub adf: Option<AdfResult>,
    pub warnings: Vec<String>,
    pub performance: PerformanceSummary,
    pub adjusted_performance: PerformanceSummary,
    #[serde(with = "pairlab_core::nan_serde")]
    pub win_rate: f64,
    pub stop_loss_exits: usize,
    pub trades: Vec<TradeRecord>,
    pub daily: Vec<DailyRecord>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl PairBacktestResult {
    /// True when the spread rejected a unit root at the 5% level.
    pub fn spread_is_stationary(&self) -> bool {
        self.adf.as_ref().is_some_and(|a| a.is_stationary(ADF_ALPHA))
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.daily.iter().map(|d| d.strategy_return).collect()
    }

    pub fn adjusted_returns(&self) -> Vec<f64> {
        self.daily.iter().map(|d| d.adjusted_return).collect()
    }
}

/// Load the configured pair and run the backtest on it.
pub fn run_single_backtest(
    config: &PairConfig,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<PairBacktestResult, RunError> {
    config.validate()?;
    let loaded = load_pair(
        &config.pair.symbol_a,
        &config.pair.symbol_b,
        cache,
        provider,
        opts,
    )?;
    let mut result = run_pair_backtest(config, &loaded.aligned)?;
    result.has_synthetic = loaded.has_synthetic;
    result.data_sources = loaded.sources;
    if result.has_synthetic {
        result
            .warnings
            .push("one or both legs use synthetic data".to_string());
    }
    Ok(result)
}

/// Run the full pipeline on an aligned pair. No I/O.
///
/// fit spread → ADF (isolated) → signals → execution lag → leg returns →
/// simulate → evaluate raw and adjusted returns.
pub fn run_pair_backtest(
    config: &PairConfig,
    aligned: &AlignedPair,
) -> Result<PairBacktestResult, RunError> {
    let common = aligned.len();
    if aligned.a.len() != common || aligned.b.len() != common {
        return Err(RunError::Computation(PairsError::InvalidInput(format!(
            "{} dates but {} closes for {} and {} for {}",
            common,
            aligned.a.len(),
            aligned.symbol_a,
            aligned.b.len(),
            aligned.symbol_b
        ))));
    }
    let (start_date, end_date) = match (aligned.dates.first(), aligned.dates.last()) {
        (Some(first), Some(last)) if common >= 2 => (*first, *last),
        _ => return Err(RunError::InsufficientOverlap { common }),
    };
    let strategy = &config.strategy;

    let model = fit_spread(&aligned.a, &aligned.b)?;
    debug!(
        hedge_ratio = model.hedge_ratio,
        intercept = model.intercept,
        "spread fitted"
    );

    let mut warnings = Vec::new();
    let adf = match adf_test(&model.residuals, AdfOptions::default()) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(error = %e, "stationarity check failed; continuing without it");
            warnings.push(format!("stationarity check failed: {e}"));
            None
        }
    };

    let stats = rolling_stats(&model.residuals, strategy.window)?;
    let signals = generate_signals(&model.residuals, strategy.window, strategy.threshold)?;
    let executed = execute_signals(&signals);
    let return_a = daily_returns(&aligned.a);
    let return_b = daily_returns(&aligned.b);

    let sim = simulate(&executed, &return_a, &return_b, strategy.stop_loss_threshold)?;
    let performance = evaluate(&sim.strategy_returns)?;
    let adjusted_performance = evaluate(&sim.adjusted_returns)?;

    info!(
        a = %aligned.symbol_a,
        b = %aligned.symbol_b,
        dates = common,
        trades = sim.trades.len(),
        stopped = sim.stop_loss_exits(),
        "backtest complete"
    );

    let cumulative = cumulative_returns(&sim.strategy_returns);
    let adjusted_cumulative = cumulative_returns(&sim.adjusted_returns);
    let daily = (0..common)
        .map(|i| DailyRecord {
            date: aligned.dates[i],
            close_a: aligned.a[i],
            close_b: aligned.b[i],
            spread: model.residuals[i],
            rolling_mean: stats[i].map(|s| s.mean),
            rolling_std: stats[i].map(|s| s.std),
            signal: signals[i],
            executed: executed[i],
            return_a: return_a[i],
            return_b: return_b[i],
            strategy_return: sim.strategy_returns[i],
            adjusted_return: sim.adjusted_returns[i],
            cumulative: cumulative[i],
            adjusted_cumulative: adjusted_cumulative[i],
        })
        .collect();

    let trades = sim
        .trades
        .iter()
        .map(|t| TradeRecord::from_trade(t, &aligned.dates))
        .collect();

    Ok(PairBacktestResult {
        schema_version: SCHEMA_VERSION,
        config: config.clone(),
        run_id: config.run_id(),
        symbol_a: aligned.symbol_a.clone(),
        symbol_b: aligned.symbol_b.clone(),
        start_date,
        end_date,
        observations: common,
        dataset_hash: aligned.dataset_hash(),
        has_synthetic: false,
        data_sources: BTreeMap::new(),
        spread: SpreadSummary::from(&model),
        adf,
        warnings,
        performance,
        adjusted_performance,
        win_rate: win_rate(&sim.trades),
        stop_loss_exits: sim.stop_loss_exits(),
        trades,
        daily,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PairSection, StrategySection};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64)
    }

    fn config() -> PairConfig {
        PairConfig {
            pair: PairSection {
                symbol_a: "AAA".into(),
                symbol_b: "BBB".into(),
                start_date: d(0),
                end_date: d(100),
            },
            strategy: StrategySection::default(),
        }
    }

    fn pair(a: Vec<f64>, b: Vec<f64>) -> AlignedPair {
        AlignedPair {
            symbol_a: "AAA".into(),
            symbol_b: "BBB".into(),
            dates: (0..a.len() as u32).map(d).collect(),
            a,
            b,
        }
    }

    #[test]
    fn single_common_date_is_insufficient_overlap() {
        let err = run_pair_backtest(&config(), &pair(vec![1.0], vec![2.0])).unwrap_err();
        assert!(matches!(err, RunError::InsufficientOverlap { common: 1 }));
        let err = run_pair_backtest(&config(), &pair(vec![], vec![])).unwrap_err();
        assert!(matches!(err, RunError::InsufficientOverlap { common: 0 }));
    }

    #[test]
    fn ragged_pair_is_rejected() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let mut ragged = pair(closes.clone(), closes.clone());
        ragged.dates.push(d(20));
        let err = run_pair_backtest(&config(), &ragged).unwrap_err();
        assert!(matches!(err, RunError::Computation(PairsError::InvalidInput(_))));

        let mut short_b = pair(closes.clone(), closes);
        short_b.b.pop();
        let err = run_pair_backtest(&config(), &short_b).unwrap_err();
        assert!(matches!(err, RunError::Computation(PairsError::InvalidInput(_))));
    }

    #[test]
    fn constant_leg_is_computation_error() {
        let a: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let err = run_pair_backtest(&config(), &pair(a, vec![5.0; 20])).unwrap_err();
        assert!(matches!(err, RunError::Computation(PairsError::Regression(_))));
    }

    #[test]
    fn short_series_skips_adf_with_warning() {
        let a = vec![10.0, 11.0, 10.5, 12.0, 11.5];
        let b = vec![20.0, 21.5, 20.5, 23.0, 22.0];
        let result = run_pair_backtest(&config(), &pair(a, b)).unwrap();
        assert!(result.adf.is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("stationarity"));
        assert_eq!(result.daily.len(), 5);
        assert!(!result.spread_is_stationary());
    }

    #[test]
    fn daily_rows_line_up_with_inputs() {
        let b: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.7).sin() * 3.0 + i as f64 * 0.1).collect();
        let a: Vec<f64> = b
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 + 1.2 * v + (i as f64 * 1.3).cos())
            .collect();
        let result = run_pair_backtest(&config(), &pair(a.clone(), b)).unwrap();

        assert_eq!(result.observations, 60);
        assert_eq!(result.start_date, d(0));
        assert_eq!(result.end_date, d(59));
        assert_eq!(result.daily[0].executed, Signal::Flat);
        assert!(result.daily[0].return_a.is_nan());
        assert!(result.daily[0].strategy_return.is_nan());
        assert!(result.daily[0].adjusted_return.is_nan());
        assert_eq!(result.performance.observations, 59);
        for (i, row) in result.daily.iter().enumerate() {
            assert_eq!(row.close_a, a[i]);
            if i > 0 {
                assert_eq!(row.executed, result.daily[i - 1].signal);
                if row.executed.is_flat() {
                    assert_eq!(row.strategy_return, 0.0);
                }
            }
        }
        for row in &result.daily[..9] {
            assert!(row.rolling_mean.is_none());
        }
        assert!(result.daily[9].rolling_std.is_some());
        assert_eq!(result.run_id, config().run_id());
        assert_eq!(
            result.stop_loss_exits,
            result
                .trades
                .iter()
                .filter(|t| t.status == TradeStatus::ClosedByStopLoss)
                .count()
        );
    }
}
