//! Market data: providers, Parquet cache, and pair alignment.

pub mod align;
pub mod cache;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_pair, AlignedPair};
pub use cache::{CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticPairProvider;
pub use yahoo::YahooProvider;
