//! Single-pass simulation over executed signals and leg returns.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::returns::strategy_returns;
use super::state::TradeState;
use crate::domain::{Signal, Trade, TradeStatus};
use crate::error::Result;

/// Raw and stop-loss-adjusted strategy returns plus the trade ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy_returns: Vec<f64>,
    pub adjusted_returns: Vec<f64>,
    pub trades: Vec<Trade>,
}

impl SimulationResult {
    pub fn stop_loss_exits(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.status == TradeStatus::ClosedByStopLoss)
            .count()
    }
}

/// Simulate the pair strategy.
///
/// `executed` must already carry the one-day lag. All three sequences must
/// have the same length.
pub fn simulate(
    executed: &[Signal],
    return_a: &[f64],
    return_b: &[f64],
    stop_loss: f64,
) -> Result<SimulationResult> {
    let raw = strategy_returns(executed, return_a, return_b)?;

    let mut trades = Vec::new();
    let mut adjusted = Vec::with_capacity(raw.len());
    let final_state = executed.iter().zip(&raw).enumerate().fold(
        TradeState::Flat,
        |state, (i, (&signal, &ret))| {
            let out = state.step(i, signal, ret, stop_loss);
            adjusted.push(out.adjusted_return);
            trades.extend(out.closed);
            out.next
        },
    );
    trades.extend(final_state.into_open_trade());

    let result = SimulationResult {
        strategy_returns: raw,
        adjusted_returns: adjusted,
        trades,
    };
    debug!(
        dates = executed.len(),
        trades = result.trades.len(),
        stop_loss_exits = result.stop_loss_exits(),
        "simulated pair strategy"
    );
    Ok(result)
}
