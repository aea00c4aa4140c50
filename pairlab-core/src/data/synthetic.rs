//! Seeded synthetic cointegrated pair for offline runs and tests.
//!
//! Leg B is a geometric random walk. Leg A is `intercept + hedge_ratio * B`
//! plus AR(1) noise, so the two legs are cointegrated by construction.
//! Weekends are skipped; there are no holidays. Results built on this data
//! are tagged synthetic by the runner.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{PriceBar, PriceSeries};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticParams {
    pub start_price: f64,
    /// Daily log-return volatility of leg B.
    pub daily_vol: f64,
    pub intercept: f64,
    pub hedge_ratio: f64,
    /// AR(1) coefficient of the residual; below 1 for mean reversion.
    pub ar_coef: f64,
    pub noise_std: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            daily_vol: 0.012,
            intercept: 5.0,
            hedge_ratio: 0.8,
            ar_coef: 0.85,
            noise_std: 0.6,
        }
    }
}

pub struct SyntheticPairProvider {
    symbol_a: String,
    symbol_b: String,
    seed: u64,
    params: SyntheticParams,
}

impl SyntheticPairProvider {
    pub fn new(symbol_a: impl Into<String>, symbol_b: impl Into<String>, seed: u64) -> Self {
        Self {
            symbol_a: symbol_a.into(),
            symbol_b: symbol_b.into(),
            seed,
            params: SyntheticParams::default(),
        }
    }

    pub fn with_params(mut self, params: SyntheticParams) -> Self {
        self.params = params;
        self
    }

    /// Both legs over the weekdays in `start..=end`.
    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> (PriceSeries, PriceSeries) {
        let key = format!("{}|{}|{}", self.symbol_a, self.symbol_b, self.seed);
        let mut rng = StdRng::from_seed(*blake3::hash(key.as_bytes()).as_bytes());
        let p = self.params;

        let mut bars_a = Vec::new();
        let mut bars_b = Vec::new();
        let mut price_b = p.start_price;
        let mut residual = 0.0;

        for date in start.iter_days().take_while(|d| *d <= end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            price_b *= (p.daily_vol * standard_normal(&mut rng)).exp();
            residual = p.ar_coef * residual + p.noise_std * standard_normal(&mut rng);
            let price_a = (p.intercept + p.hedge_ratio * price_b + residual).max(0.01);
            bars_a.push(PriceBar::new(date, price_a));
            bars_b.push(PriceBar::new(date, price_b));
        }

        (
            PriceSeries::new(self.symbol_a.clone(), bars_a),
            PriceSeries::new(self.symbol_b.clone(), bars_b),
        )
    }
}

/// Box–Muller draw from N(0, 1).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl DataProvider for SyntheticPairProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let (a, b) = self.generate(start, end);
        let series = if symbol == self.symbol_a {
            a
        } else if symbol == self.symbol_b {
            b
        } else {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        };
        Ok(FetchResult {
            series,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    fn requires_network(&self) -> bool {
        false
    }
}
