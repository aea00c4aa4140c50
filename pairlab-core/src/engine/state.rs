//! Stop-loss trade state machine.

use crate::domain::{Signal, Trade, TradeStatus};

/// Whether a trade is in progress, and its running growth since entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TradeState {
    #[default]
    Flat,
    InTrade {
        entry_index: usize,
        side: Signal,
        /// Running product of `1 + strategy return` since entry.
        growth: f64,
    },
}

/// Result of advancing the machine by one date.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub next: TradeState,
    pub adjusted_return: f64,
    /// Trade closed on this date, if any.
    pub closed: Option<Trade>,
}

impl TradeState {
    pub fn is_open(&self) -> bool {
        matches!(self, TradeState::InTrade { .. })
    }

    /// Advance by one date.
    ///
    /// Order within a date: entry, cumulate, stop-loss, flat exit. A NaN
    /// strategy return counts as zero growth but passes through unchanged as
    /// the adjusted return. A side flip without a flat day keeps the trade.
    pub fn step(
        self,
        index: usize,
        executed: Signal,
        strategy_return: f64,
        stop_loss: f64,
    ) -> StepOutcome {
        let state = match self {
            TradeState::Flat if !executed.is_flat() => TradeState::InTrade {
                entry_index: index,
                side: executed,
                growth: 1.0,
            },
            other => other,
        };

        let TradeState::InTrade {
            entry_index,
            side,
            growth,
        } = state
        else {
            return StepOutcome {
                next: TradeState::Flat,
                adjusted_return: strategy_return,
                closed: None,
            };
        };

        let contribution = if strategy_return.is_nan() { 0.0 } else { strategy_return };
        let growth = growth * (1.0 + contribution);

        let close = |status| Trade {
            entry_index,
            exit_index: Some(index),
            side,
            cumulative_return: growth - 1.0,
            status,
        };

        if growth - 1.0 < stop_loss {
            return StepOutcome {
                next: TradeState::Flat,
                adjusted_return: 0.0,
                closed: Some(close(TradeStatus::ClosedByStopLoss)),
            };
        }

        if executed.is_flat() {
            return StepOutcome {
                next: TradeState::Flat,
                adjusted_return: strategy_return,
                closed: Some(close(TradeStatus::ClosedBySignalFlat)),
            };
        }

        StepOutcome {
            next: TradeState::InTrade {
                entry_index,
                side,
                growth,
            },
            adjusted_return: strategy_return,
            closed: None,
        }
    }

    /// The still-open trade at the end of the series, if any.
    pub fn into_open_trade(self) -> Option<Trade> {
        match self {
            TradeState::Flat => None,
            TradeState::InTrade {
                entry_index,
                side,
                growth,
            } => Some(Trade {
                entry_index,
                exit_index: None,
                side,
                cumulative_return: growth - 1.0,
                status: TradeStatus::Open,
            }),
        }
    }
}
