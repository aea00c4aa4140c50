//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over close-price sources (Yahoo Finance,
//! CSV files, synthetic pairs) so they can be swapped and mocked in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider blocked requests (HTTP 403)")]
    Blocked,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no cached data for symbol '{symbol}'; run `pairlab download` first")]
    NoCachedData { symbol: String },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("parquet I/O error: {0}")]
    ParquetError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Cache,
    Synthetic,
}

impl DataSource {
    pub fn is_synthetic(self) -> bool {
        self == DataSource::Synthetic
    }
}

/// Result of a successful fetch for one symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub source: DataSource,
}

/// A source of daily close prices.
///
/// Providers know nothing about the cache; the runner layers caching on top.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch daily closes for `symbol` with `start <= date <= end`, ascending.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Whether the provider is currently willing to serve requests.
    fn is_available(&self) -> bool;

    /// Whether `fetch` goes over the network. Offline runs skip such providers.
    fn requires_network(&self) -> bool {
        true
    }
}
