//! Synthetic provider for offline runs and tests.
//!
//! Produces a deterministic random walk per symbol: the RNG is seeded from a
//! BLAKE3 hash of the symbol, so the same symbol always yields the same bars.
//! These are clearly fake and tagged `DataSource::Synthetic`.

use super::provider::{
    BarInterval, DataError, DataProvider, DataSource, FetchResult, LookbackPeriod, RawBar,
};
use chrono::{DateTime, Datelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    /// Series end at `anchor` (inclusive).
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    /// Series end at today's UTC midnight.
    pub fn anchored_today() -> Self {
        let today = Utc::now().date_naive();
        let anchor = today
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(anchor)
    }

    pub fn generate(&self, symbol: &str, period: LookbackPeriod, interval: BarInterval) -> Vec<RawBar> {
        let seed = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let start = self.anchor - period.duration();
        let step = interval.duration();
        let mut timestamps = Vec::new();
        let mut t = start;
        while t <= self.anchor {
            let weekend = matches!(t.weekday(), Weekday::Sat | Weekday::Sun);
            if interval == BarInterval::Weekly || !weekend {
                timestamps.push(t);
            }
            t += step;
        }

        let mut price = rng.gen_range(1.0..100.0_f64);
        let drift = rng.gen_range(-0.004..0.004_f64);
        let base_volume = rng.gen_range(50_000.0..5_000_000.0_f64);

        timestamps
            .into_iter()
            .map(|timestamp| {
                let daily_return: f64 = drift + rng.gen_range(-0.025..0.025);
                let open = price;
                let close = price * (1.0 + daily_return);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = (base_volume * rng.gen_range(0.5..1.6)).round();
                price = close;
                RawBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    adj_close: None,
                }
            })
            .collect()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> Result<FetchResult, DataError> {
        let bars = self.generate(symbol, period, interval);
        if bars.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
