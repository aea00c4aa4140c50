//! Price loading and data resolution for the runner.
//!
//! Loads both legs of a pair and aligns them on common dates. Each leg
//! resolves through the fallback policy:
//! 1. If cached data covers the range → use it; a partial cache is re-fetched
//!    and only used as is when no provider can fill it
//! 2. If not cached and a provider is available → fetch and cache
//! 3. If no data and `synthetic` is set → generate a synthetic leg (tagged)
//! 4. Otherwise → fail with a clear error
//!
//! Synthetic legs come from one seeded cointegrated generator so a fully
//! synthetic pair is reproducible across runs.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use pairlab_core::data::{
    align_pair, AlignedPair, CoverageResult, DataError, DataProvider, DataSource, ParquetCache,
    SyntheticPairProvider,
};
use pairlab_core::domain::PriceSeries;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Seed for synthetic fallback data.
pub const SYNTHETIC_SEED: u64 = 42;

/// Calendar days at either end of the range a cache may miss and still count
/// as covering it (weekends and holidays).
const COVERAGE_SLACK_DAYS: i64 = 5;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for '{symbol}' and no network access (use --synthetic for synthetic data)"
    )]
    NoCachedDataOffline { symbol: String },

    #[error("no cached data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic prices when real data is unavailable.
    pub synthetic: bool,
    /// Skip the cache and fetch again.
    pub force: bool,
}

/// Both legs aligned, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedPair {
    pub aligned: AlignedPair,
    /// Data source per symbol.
    pub sources: BTreeMap<String, DataSource>,
    /// BLAKE3 over the aligned dates and closes.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Load and align the two legs of a pair.
pub fn load_pair(
    symbol_a: &str,
    symbol_b: &str,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedPair, LoadError> {
    let synthetic = SyntheticPairProvider::new(symbol_a, symbol_b, SYNTHETIC_SEED);
    let mut sources = BTreeMap::new();

    let (series_a, source_a) = load_symbol(symbol_a, cache, provider, &synthetic, opts)?;
    sources.insert(symbol_a.to_string(), source_a);
    let (series_b, source_b) = load_symbol(symbol_b, cache, provider, &synthetic, opts)?;
    sources.insert(symbol_b.to_string(), source_b);

    let aligned = align_pair(&series_a, &series_b)?;
    let dataset_hash = aligned.dataset_hash();
    let has_synthetic = sources.values().any(|s| s.is_synthetic());

    info!(
        a = symbol_a,
        b = symbol_b,
        common_dates = aligned.len(),
        synthetic = has_synthetic,
        "pair loaded"
    );

    Ok(LoadedPair {
        aligned,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

fn load_symbol(
    symbol: &str,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    synthetic: &SyntheticPairProvider,
    opts: &LoadOptions,
) -> Result<(PriceSeries, DataSource), LoadError> {
    // Step 1: cache
    let mut partial = None;
    if !opts.force {
        match cache.load(symbol) {
            Ok(series) => {
                let restricted = series.restrict(opts.start, opts.end);
                if restricted.is_empty() {
                    debug!(symbol, "cache has no bars in the requested range");
                } else if let CoverageResult::PartiallyCovered {
                    cached_start,
                    cached_end,
                } = coverage(cache, symbol, opts)
                {
                    warn!(
                        symbol,
                        %cached_start,
                        %cached_end,
                        start = %opts.start,
                        end = %opts.end,
                        "cache covers only part of the requested range"
                    );
                    partial = Some(restricted);
                } else {
                    debug!(symbol, bars = restricted.len(), "loaded from cache");
                    return Ok((restricted, DataSource::Cache));
                }
            }
            Err(e) => debug!(symbol, error = %e, "cache miss"),
        }
    }

    // Step 2: provider (local providers are allowed offline)
    let mut failure = String::from("no data provider available");
    let usable = provider.filter(|p| p.is_available() && (!opts.offline || !p.requires_network()));
    if let Some(prov) = usable {
        match prov.fetch(symbol, opts.start, opts.end) {
            Ok(fetched) => {
                cache.write(&fetched.series, fetched.source)?;
                info!(symbol, provider = prov.name(), bars = fetched.series.len(), "fetched and cached");
                return Ok((fetched.series, fetched.source));
            }
            Err(e) => {
                warn!(symbol, provider = prov.name(), error = %e, "fetch failed");
                failure = e.to_string();
            }
        }
    }

    if let Some(series) = partial {
        warn!(symbol, bars = series.len(), "backtesting on the partially cached range");
        return Ok((series, DataSource::Cache));
    }

    // Step 3: synthetic
    if opts.synthetic {
        warn!(symbol, "generating synthetic data; results will be tagged as synthetic");
        let fetched = synthetic.fetch(symbol, opts.start, opts.end)?;
        return Ok((fetched.series, DataSource::Synthetic));
    }

    // Step 4: fail
    if opts.offline {
        return Err(LoadError::NoCachedDataOffline {
            symbol: symbol.to_string(),
        });
    }
    Err(LoadError::DownloadFailed {
        symbol: symbol.to_string(),
        reason: failure,
    })
}

/// Cache coverage of the requested range, allowing for non-trading days at
/// either end.
fn coverage(cache: &ParquetCache, symbol: &str, opts: &LoadOptions) -> CoverageResult {
    let slack = Duration::days(COVERAGE_SLACK_DAYS);
    let start = (opts.start + slack).min(opts.end);
    let end = (opts.end - slack).max(start);
    cache.covers_range(symbol, start, end)
}
