//! Domain types for PairLab

pub mod bar;
pub mod signal;
pub mod trade;

pub use bar::{PriceBar, PriceSeries};
pub use signal::Signal;
pub use trade::{Trade, TradeStatus};
