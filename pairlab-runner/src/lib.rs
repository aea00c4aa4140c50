//! PairLab Runner: pair backtest orchestration on top of `pairlab-core`.
//!
//! - TOML configuration with validation and run fingerprints
//! - Data loading with cache/download/synthetic fallback
//! - The end-to-end pair backtest pipeline
//! - JSON/CSV artifacts and the terminal report

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigError, ConfigOverrides, PairConfig, PairSection, StrategySection};
pub use data_loader::{load_pair, LoadError, LoadOptions, LoadedPair};
pub use export::{load_artifacts, render_report, save_artifacts};
pub use runner::{
    run_pair_backtest, run_single_backtest, DailyRecord, PairBacktestResult, RunError,
    TradeRecord, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<PairBacktestResult>();
        assert_sync::<PairBacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PairConfig>();
        assert_sync::<PairConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
