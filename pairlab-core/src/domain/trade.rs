//! Trade: one contiguous run of non-flat executed signals.

use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// How a trade ended (or that it has not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Open,
    ClosedByStopLoss,
    ClosedBySignalFlat,
}

/// A trade as recorded by the execution simulator.
///
/// `cumulative_return` is the running product of `1 + strategy return` since
/// entry, minus one. For a stop-loss exit it includes the breaching day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_index: usize,
    /// Index of the date on which the trade closed; `None` while open.
    pub exit_index: Option<usize>,
    /// Executed signal on the entry date.
    pub side: Signal,
    pub cumulative_return: f64,
    pub status: TradeStatus,
}

impl Trade {
    /// Number of dates the trade accrued returns (entry date included).
    ///
    /// A signal-flat exit happens on a date that no longer accrues, so that
    /// date is not counted.
    pub fn days_held(&self, series_len: usize) -> usize {
        match (self.status, self.exit_index) {
            (TradeStatus::ClosedByStopLoss, Some(exit)) => exit - self.entry_index + 1,
            (TradeStatus::ClosedBySignalFlat, Some(exit)) => exit - self.entry_index,
            _ => series_len.saturating_sub(self.entry_index),
        }
    }

    pub fn is_winner(&self) -> bool {
        self.cumulative_return > 0.0
    }
}
