//! Performance evaluator and the full core pipeline on synthetic data.

use chrono::NaiveDate;
use pairlab_core::data::{align_pair, SyntheticPairProvider};
use pairlab_core::engine::{daily_returns, simulate};
use pairlab_core::performance::{cumulative_returns, evaluate, max_drawdown};
use pairlab_core::signals::{execute_signals, generate_signals};
use pairlab_core::spread::fit_spread;
use pairlab_core::stationarity::{adf_test, AdfOptions};

#[test]
fn constant_zero_returns() {
    let summary = evaluate(&[0.0; 100]).unwrap();
    assert!(summary.annualized_sharpe.is_nan());
    assert_eq!(summary.max_drawdown, 0.0);
    assert_eq!(summary.std_daily_return, 0.0);
}

#[test]
fn monotone_curve_has_zero_drawdown() {
    let summary = evaluate(&[0.01, 0.0, 0.02, 0.005]).unwrap();
    assert_eq!(summary.max_drawdown, 0.0);
    assert!(summary.annualized_sharpe > 0.0);
}

#[test]
fn drawdown_is_worst_peak_to_trough() {
    // peaks 1.2 then falls to 0.6: 50% drawdown; earlier dip is smaller
    let curve = [1.0, 0.9, 1.2, 0.8, 0.6, 1.0];
    assert!((max_drawdown(&curve) - 0.5).abs() < 1e-12);
}

#[test]
fn total_wipeout_bounds_drawdown_at_one() {
    let summary = evaluate(&[0.1, -1.0, 0.5]).unwrap();
    assert!((summary.max_drawdown - 1.0).abs() < 1e-12);
    let curve = cumulative_returns(&[0.1, -1.0, 0.5]);
    assert!(curve.iter().all(|&c| c >= 0.0));
}

#[test]
fn evaluate_is_idempotent() {
    let r = [0.01, -0.02, f64::NAN, 0.003, 0.0, -0.004];
    let first = evaluate(&r).unwrap();
    let second = evaluate(&r).unwrap();
    assert_eq!(first.mean_daily_return, second.mean_daily_return);
    assert_eq!(first.annualized_sharpe, second.annualized_sharpe);
    assert_eq!(first.max_drawdown, second.max_drawdown);
}

#[test]
fn pipeline_on_synthetic_cointegrated_pair() {
    let provider = SyntheticPairProvider::new("AAA", "BBB", 7);
    let (a, b) = provider.generate(
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
    );
    let aligned = align_pair(&a, &b).unwrap();
    assert!(aligned.len() > 700);

    let model = fit_spread(&aligned.a, &aligned.b).unwrap();
    assert!((model.hedge_ratio - 0.8).abs() < 0.1);
    assert_eq!(model.residuals.len(), aligned.len());

    let adf = adf_test(&model.residuals, AdfOptions::default()).unwrap();
    assert!(adf.is_stationary(0.05), "ADF p-value {}", adf.p_value);

    let signals = generate_signals(&model.residuals, 10, 1.5).unwrap();
    let executed = execute_signals(&signals);
    let ret_a = daily_returns(&aligned.a);
    let ret_b = daily_returns(&aligned.b);
    let sim = simulate(&executed, &ret_a, &ret_b, -0.02).unwrap();
    assert_eq!(sim.strategy_returns.len(), aligned.len());
    assert!(!sim.trades.is_empty());

    let base = evaluate(&sim.strategy_returns).unwrap();
    let adjusted = evaluate(&sim.adjusted_returns).unwrap();
    assert!(base.max_drawdown >= 0.0 && base.max_drawdown <= 1.0);
    assert!(adjusted.max_drawdown >= 0.0 && adjusted.max_drawdown <= 1.0);
    // the first date has no leg returns and is left out
    assert!(sim.strategy_returns[0].is_nan());
    assert_eq!(base.observations, aligned.len() - 1);
    assert_eq!(adjusted.observations, aligned.len() - 1);
}
