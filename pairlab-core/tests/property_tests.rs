//! Property tests for signal and simulator invariants.
//!
//! 1. Warm-up dates are flat
//! 2. Executed signal is the previous date's signal
//! 3. Flat dates with defined leg returns earn exactly zero
//! 4. A stop-loss exit zeroes that date's adjusted return; all other dates pass through
//! 5. Trades never overlap
//! 6. Cumulative curve stays non-negative and drawdown stays in [0, 1]

use pairlab_core::domain::{Signal, TradeStatus};
use pairlab_core::engine::simulate;
use pairlab_core::performance::{cumulative_returns, evaluate};
use pairlab_core::signals::{execute_signals, generate_signals};
use proptest::prelude::*;

fn arb_spread() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5.0..5.0_f64, 1..120)
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Long), Just(Signal::Short), Just(Signal::Flat)]
}

/// Executed signals with matching leg returns in a plausible daily range.
fn arb_path() -> impl Strategy<Value = (Vec<Signal>, Vec<f64>, Vec<f64>)> {
    (1usize..150).prop_flat_map(|n| {
        (
            prop::collection::vec(arb_signal(), n),
            prop::collection::vec(-0.05..0.05_f64, n),
            prop::collection::vec(-0.05..0.05_f64, n),
        )
    })
}

proptest! {
    #[test]
    fn warmup_is_flat(spread in arb_spread(), window in 1usize..20, threshold in 0.1..3.0_f64) {
        let signals = generate_signals(&spread, window, threshold).unwrap();
        prop_assert_eq!(signals.len(), spread.len());
        for s in signals.iter().take(window.saturating_sub(1)) {
            prop_assert!(s.is_flat());
        }
    }

    #[test]
    fn executed_is_lagged_signal(spread in arb_spread(), window in 2usize..15) {
        let signals = generate_signals(&spread, window, 1.0).unwrap();
        let executed = execute_signals(&signals);
        prop_assert_eq!(executed[0], Signal::Flat);
        for t in 1..signals.len() {
            prop_assert_eq!(executed[t], signals[t - 1]);
        }
    }

    #[test]
    fn flat_dates_earn_zero((executed, ra, rb) in arb_path(), stop in -0.2..-0.001_f64) {
        let sim = simulate(&executed, &ra, &rb, stop).unwrap();
        for (t, s) in executed.iter().enumerate() {
            if s.is_flat() {
                prop_assert_eq!(sim.strategy_returns[t], 0.0);
            }
        }
    }

    #[test]
    fn adjusted_differs_only_on_stop_dates((executed, ra, rb) in arb_path(), stop in -0.2..-0.001_f64) {
        let sim = simulate(&executed, &ra, &rb, stop).unwrap();
        let stop_dates: Vec<usize> = sim
            .trades
            .iter()
            .filter(|t| t.status == TradeStatus::ClosedByStopLoss)
            .filter_map(|t| t.exit_index)
            .collect();
        for t in 0..executed.len() {
            if stop_dates.contains(&t) {
                prop_assert_eq!(sim.adjusted_returns[t], 0.0);
            } else {
                prop_assert_eq!(sim.adjusted_returns[t], sim.strategy_returns[t]);
            }
        }
        for trade in sim.trades.iter().filter(|t| t.status == TradeStatus::ClosedByStopLoss) {
            prop_assert!(trade.cumulative_return < stop);
        }
    }

    #[test]
    fn trades_do_not_overlap((executed, ra, rb) in arb_path(), stop in -0.2..-0.001_f64) {
        let sim = simulate(&executed, &ra, &rb, stop).unwrap();
        for pair in sim.trades.windows(2) {
            let prev_exit = pair[0].exit_index.unwrap();
            prop_assert!(pair[1].entry_index > prev_exit);
        }
        // only the last trade may still be open
        for trade in sim.trades.iter().rev().skip(1) {
            prop_assert!(trade.status != TradeStatus::Open);
        }
        for trade in &sim.trades {
            prop_assert!(!executed[trade.entry_index].is_flat());
        }
    }

    #[test]
    fn curve_and_drawdown_bounds(returns in prop::collection::vec(-1.0..1.0_f64, 1..200)) {
        let curve = cumulative_returns(&returns);
        prop_assert!(curve.iter().all(|&c| c >= 0.0));
        let summary = evaluate(&returns).unwrap();
        prop_assert!(summary.max_drawdown >= 0.0);
        prop_assert!(summary.max_drawdown <= 1.0 + 1e-12);
    }
}
