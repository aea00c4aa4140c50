//! PriceBar: one daily close observation for one instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close for a single instrument on a single date.
///
/// Closes are split/dividend adjusted when the provider offers an adjusted series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// A bar is usable when its close is a finite, strictly positive price.
    pub fn is_valid(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Date-ordered close history for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Keep only bars with `start <= date <= end`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect(),
        }
    }
}
