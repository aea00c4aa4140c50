//! PairLab Core: pairs-trading statistics and stop-loss-aware backtesting.
//!
//! This crate contains the computation and data layers:
//! - Domain types (price bars and series, signals, trades)
//! - Spread model (OLS hedge) and ADF stationarity test
//! - Rolling z-score signal generator with one-day execution lag
//! - Execution simulator with the stop-loss trade state machine
//! - Performance evaluator (Sharpe, drawdown, cumulative return)
//! - Market data providers, Parquet cache, and pair alignment

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod nan_serde;
pub mod performance;
pub mod signals;
pub mod spread;
pub mod stationarity;
pub mod stats;

pub use error::{PairsError, Result};
