//! End-to-end tests: synthetic load → backtest → artifacts → report.

use chrono::NaiveDate;
use pairlab_core::data::{DataSource, ParquetCache};
use pairlab_core::domain::TradeStatus;
use pairlab_runner::export::{export_json, import_json};
use pairlab_runner::{
    load_artifacts, render_report, run_single_backtest, save_artifacts, LoadOptions, PairConfig,
    RunError, SCHEMA_VERSION,
};

const CONFIG: &str = r#"
[pair]
symbol_a = "AAA"
symbol_b = "BBB"
start_date = "2019-01-01"
end_date = "2021-12-31"

[strategy]
window = 10
threshold = 1.5
stop_loss_threshold = -0.02
"#;

fn synthetic_opts(config: &PairConfig) -> LoadOptions {
    LoadOptions {
        start: config.pair.start_date,
        end: config.pair.end_date,
        offline: true,
        synthetic: true,
        force: false,
    }
}

fn run_synthetic() -> pairlab_runner::PairBacktestResult {
    let config = PairConfig::from_toml(CONFIG).unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = ParquetCache::new(cache_dir.path());
    run_single_backtest(&config, &cache, None, &synthetic_opts(&config)).unwrap()
}

#[test]
fn synthetic_pair_runs_end_to_end() {
    let result = run_synthetic();

    assert!(result.has_synthetic);
    assert_eq!(result.data_sources["AAA"], DataSource::Synthetic);
    assert!(result.warnings.iter().any(|w| w.contains("synthetic")));
    assert_eq!(result.daily.len(), result.observations);
    assert!(result.observations > 700);
    assert_eq!(result.start_date, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());

    // The generator is cointegrated by construction.
    let adf = result.adf.as_ref().expect("ADF should run on three years of data");
    assert!(adf.p_value < 0.05, "p = {}", adf.p_value);
    assert!((result.spread.hedge_ratio - 0.8).abs() < 0.2);

    assert!(!result.trades.is_empty());
    assert!(result.performance.annualized_sharpe.is_finite());
    assert!(result.adjusted_performance.max_drawdown >= 0.0);
    for t in &result.trades {
        if t.status == TradeStatus::ClosedByStopLoss {
            assert!(t.cumulative_return <= -0.02);
        }
        assert!(t.entry_date <= t.exit_date.unwrap_or(result.end_date));
    }
}

#[test]
fn runs_are_deterministic() {
    let first = run_synthetic();
    let second = run_synthetic();
    assert_eq!(first.dataset_hash, second.dataset_hash);
    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.trades, second.trades);
}

#[test]
fn artifacts_round_trip() {
    let result = run_synthetic();
    let out = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&result, out.path()).unwrap();

    let name = run_dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("AAA_BBB_"));
    for file in ["manifest.json", "daily.csv", "trades.csv"] {
        assert!(run_dir.join(file).exists(), "missing {file}");
    }

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.trades, result.trades);
    assert_eq!(loaded.daily.len(), result.daily.len());
    // undefined first-day leg returns survive as NaN
    assert!(loaded.daily[0].return_a.is_nan());
    assert_eq!(loaded.adf.map(|a| a.used_lag), result.adf.map(|a| a.used_lag));

    let daily_csv = std::fs::read_to_string(run_dir.join("daily.csv")).unwrap();
    assert_eq!(daily_csv.lines().count(), result.daily.len() + 1);
    let trades_csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades_csv.lines().count(), result.trades.len() + 1);
}

#[test]
fn newer_schema_is_rejected() {
    let mut result = run_synthetic();
    result.schema_version = SCHEMA_VERSION + 1;
    let json = export_json(&result).unwrap();
    let err = import_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn report_lists_adf_and_both_strategies() {
    let report = render_report(&run_synthetic());
    assert!(report.contains("ADF Statistic:"));
    assert!(report.contains("p-value:"));
    assert!(report.contains("Sharpe Ratio:"));
    assert!(report.contains("Maximum Drawdown:"));
    assert!(report.contains("Sharpe Ratio with stop-loss:"));
    assert!(report.contains("Maximum Drawdown with stop-loss:"));
    assert!(report.contains("SYNTHETIC"));
}

#[test]
fn invalid_config_is_rejected_before_loading() {
    let mut config = PairConfig::from_toml(CONFIG).unwrap();
    config.strategy.window = 0;
    let cache_dir = tempfile::tempdir().unwrap();
    let cache = ParquetCache::new(cache_dir.path());
    let err = run_single_backtest(&config, &cache, None, &synthetic_opts(&config)).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}
