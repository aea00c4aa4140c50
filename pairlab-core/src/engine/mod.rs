//! Execution simulator: daily dollar-neutral P&L with a stop-loss overlay.
//!
//! The simulator consumes executed (one-day-lagged) signals and the daily
//! returns of both legs, then makes a single ordered pass:
//!
//! 1. Entry: a non-flat executed signal with no open trade opens one
//! 2. Cumulate: the open trade's running product absorbs the day's return
//! 3. Stop-loss: a breach zeroes the day's adjusted return and closes the trade
//! 4. Flat exit: a flat executed signal closes a trade the stop did not close

pub mod returns;
pub mod simulator;
pub mod state;

pub use returns::{daily_returns, strategy_returns};
pub use simulator::{simulate, SimulationResult};
pub use state::{StepOutcome, TradeState};
