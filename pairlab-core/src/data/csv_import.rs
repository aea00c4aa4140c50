//! CSV import provider: `{dir}/{SYMBOL}.csv` with a `date,close` header.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PriceBar, PriceSeries};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: f64,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Read every row of a close-price CSV, sorted by date.
    pub fn read_file(path: &Path) -> Result<Vec<PriceBar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::CsvError(format!("{}: {e}", path.display())))?;
        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| {
                DataError::CsvError(format!("{} row {}: {e}", path.display(), line + 1))
            })?;
            bars.push(PriceBar::new(row.date, row.close));
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let series = PriceSeries::new(symbol, Self::read_file(&path)?).restrict(start, end);
        if series.is_empty() {
            return Err(DataError::ValidationError(format!(
                "{} has no rows between {start} and {end}",
                path.display()
            )));
        }
        debug!(symbol, bars = series.len(), path = %path.display(), "read CSV prices");
        Ok(FetchResult {
            series,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }

    fn requires_network(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn reads_and_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("KO.csv"),
            "date,close\n2024-01-03,60.5\n2024-01-02,60.0\n2024-02-01,62.0\n",
        )
        .unwrap();
        let provider = CsvProvider::new(dir.path());
        let fetched = provider.fetch("KO", d(1, 1), d(1, 31)).unwrap();
        assert_eq!(fetched.source, DataSource::CsvImport);
        assert!(!provider.requires_network());
        assert_eq!(fetched.series.len(), 2);
        assert_eq!(fetched.series.bars[0].date, d(1, 2));
        assert_eq!(fetched.series.bars[1].close, 60.5);
    }

    #[test]
    fn capitalized_headers_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PEP.csv");
        fs::write(&path, "Date,Close\n2024-01-02,170.0\n").unwrap();
        let bars = CsvProvider::read_file(&path).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch("XYZ", d(1, 1), d(2, 1)),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn malformed_row_reports_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("KO.csv"), "date,close\n2024-01-02,abc\n").unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(matches!(
            provider.fetch("KO", d(1, 1), d(2, 1)),
            Err(DataError::CsvError(_))
        ));
    }
}
