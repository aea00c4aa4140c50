//! Parquet price cache, one partition directory per symbol.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/prices.parquet` plus a `meta.json`
//! sidecar (date range, row count, BLAKE3 hash, source).
//!
//! Writes merge with what is already cached (new rows win on the same date)
//! and land atomically via `.tmp` + rename. A file that fails to load or
//! validate is renamed to `prices.parquet.quarantined`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::{DataError, DataSource};
use crate::domain::{PriceBar, PriceSeries};

const PRICES_FILE: &str = "prices.parquet";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: DataSource,
    pub cached_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
}

/// How well the cache covers a requested date range.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: NaiveDate,
        cached_end: NaiveDate,
    },
}

pub struct ParquetCache {
    cache_dir: PathBuf,
}

impl ParquetCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("symbol={symbol}"))
    }

    fn prices_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join(PRICES_FILE)
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join("meta.json")
    }

    /// Merge `series` into the cache for its symbol.
    pub fn write(&self, series: &PriceSeries, source: DataSource) -> Result<CacheMeta, DataError> {
        if series.is_empty() {
            return Err(DataError::CacheError("no bars to cache".into()));
        }
        let symbol = series.symbol.as_str();
        let dir = self.symbol_dir(symbol);
        fs::create_dir_all(&dir)
            .map_err(|e| DataError::CacheError(format!("failed to create {}: {e}", dir.display())))?;

        let mut merged: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        if let Ok(existing) = self.load(symbol) {
            merged.extend(existing.bars.iter().map(|b| (b.date, b.close)));
        }
        merged.extend(series.bars.iter().map(|b| (b.date, b.close)));
        let bars: Vec<PriceBar> = merged.into_iter().map(|(d, c)| PriceBar::new(d, c)).collect();

        let path = self.prices_path(symbol);
        let tmp_path = path.with_extension("parquet.tmp");
        let mut df = bars_to_dataframe(&bars)?;
        write_parquet(&mut df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        let (start_date, end_date) = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(DataError::CacheError("no bars to cache".into())),
        };
        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date,
            end_date,
            bar_count: bars.len(),
            data_hash: hash_bars(&bars),
            source,
            cached_at: chrono::Local::now().naive_local(),
        };
        let json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol), json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        debug!(symbol, bars = meta.bar_count, "cached prices");
        Ok(meta)
    }

    /// All cached bars for `symbol`, ascending by date.
    pub fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        let path = self.prices_path(symbol);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        match load_and_validate_parquet(&path) {
            Ok(mut bars) => {
                bars.sort_by_key(|b| b.date);
                Ok(PriceSeries::new(symbol, bars))
            }
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                warn!(path = %path.display(), error = %e, "quarantining corrupt cache file");
                let _ = fs::rename(&path, &quarantine);
                let _ = fs::remove_file(self.meta_path(symbol));
                Err(DataError::NoCachedData {
                    symbol: symbol.to_string(),
                })
            }
        }
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn status(&self, symbols: &[&str]) -> Vec<CacheStatus> {
        symbols
            .iter()
            .map(|sym| {
                let meta = self.get_meta(sym);
                CacheStatus {
                    symbol: sym.to_string(),
                    cached: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                }
            })
            .collect()
    }

    /// Symbols with a partition directory, sorted.
    pub fn cached_symbols(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else {
            return Vec::new();
        };
        let mut symbols: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|name| name.strip_prefix("symbol="))
                    .map(str::to_string)
            })
            .collect();
        symbols.sort();
        symbols
    }

    pub fn covers_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> CoverageResult {
        match self.get_meta(symbol) {
            None => CoverageResult::NotCached,
            Some(meta) if meta.start_date <= start && meta.end_date >= end => {
                CoverageResult::FullyCovered
            }
            Some(meta) => CoverageResult::PartiallyCovered {
                cached_start: meta.start_date,
                cached_end: meta.end_date,
            },
        }
    }
}

/// BLAKE3 over dates and close bit patterns.
pub fn hash_bars(bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

fn bars_to_dataframe(bars: &[PriceBar]) -> Result<DataFrame, DataError> {
    let epoch = epoch();
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch).num_days() as i32)
        .collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("close".into(), closes),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::ValidationError("empty parquet file".into()));
    }

    let dates = df
        .column("date")
        .map_err(|e| DataError::ValidationError(format!("missing column 'date': {e}")))?
        .date()
        .map_err(|e| DataError::ParquetError(format!("date column type: {e}")))?;
    let closes = df
        .column("close")
        .map_err(|e| DataError::ValidationError(format!("missing column 'close': {e}")))?
        .f64()
        .map_err(|e| DataError::ParquetError(format!("close column type: {e}")))?;

    let epoch = epoch();
    (0..df.height())
        .map(|i| {
            let days = dates
                .get(i)
                .ok_or_else(|| DataError::ParquetError(format!("null date at row {i}")))?;
            Ok(PriceBar::new(
                epoch + chrono::Duration::days(days as i64),
                closes.get(i).unwrap_or(f64::NAN),
            ))
        })
        .collect()
}
