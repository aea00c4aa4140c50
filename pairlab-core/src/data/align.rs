//! Pair alignment: inner join of two close series on date.
//!
//! Unlike a union timeline with void bars, the join keeps only dates on which
//! both legs have a usable close, so the aligned legs have no gaps relative to
//! each other and carry no NaN prices.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::DataError;
use crate::domain::PriceSeries;

/// Two close series on a shared ascending date axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub symbol_a: String,
    pub symbol_b: String,
    pub dates: Vec<NaiveDate>,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// BLAKE3 over symbols, dates, and both close columns.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol_a.as_bytes());
        hasher.update(b"|");
        hasher.update(self.symbol_b.as_bytes());
        for ((date, a), b) in self.dates.iter().zip(&self.a).zip(&self.b) {
            hasher.update(date.to_string().as_bytes());
            hasher.update(&a.to_le_bytes());
            hasher.update(&b.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

fn usable_closes(series: &PriceSeries) -> Result<BTreeMap<NaiveDate, f64>, DataError> {
    let mut seen = HashSet::new();
    let mut closes = BTreeMap::new();
    for bar in &series.bars {
        if !seen.insert(bar.date) {
            return Err(DataError::ValidationError(format!(
                "duplicate date {} in {}",
                bar.date, series.symbol
            )));
        }
        if bar.is_valid() {
            closes.insert(bar.date, bar.close);
        }
    }
    Ok(closes)
}

/// Inner-join two series on date, dropping bars without a usable close.
///
/// Fails on duplicate dates within either series.
pub fn align_pair(a: &PriceSeries, b: &PriceSeries) -> Result<AlignedPair, DataError> {
    let closes_a = usable_closes(a)?;
    let closes_b = usable_closes(b)?;

    let mut aligned = AlignedPair {
        symbol_a: a.symbol.clone(),
        symbol_b: b.symbol.clone(),
        dates: Vec::new(),
        a: Vec::new(),
        b: Vec::new(),
    };
    for (date, close_a) in &closes_a {
        if let Some(close_b) = closes_b.get(date) {
            aligned.dates.push(*date);
            aligned.a.push(*close_a);
            aligned.b.push(*close_b);
        }
    }

    debug!(
        a = %a.symbol,
        b = %b.symbol,
        bars_a = a.len(),
        bars_b = b.len(),
        common = aligned.len(),
        "aligned pair"
    );
    Ok(aligned)
}
