//! PriceSeries: ordered bars for one instrument over a lookback window.

use super::bar::PriceBar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Violations of the PriceBar / PriceSeries invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} violates OHLCV invariants (low <= open, close <= high, positive prices)")]
    InsaneBar { index: usize },

    #[error("bar {index} timestamp is not strictly after the previous bar")]
    NotIncreasing { index: usize },
}

/// Validated, timestamp-ordered bars for a single symbol.
///
/// Construction enforces the bar invariants and strictly increasing
/// timestamps. Minimum length is not enforced here; the analysis pipeline
/// rejects short series before computing indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSeries")]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

/// Wire shape of a series before validation.
#[derive(Deserialize)]
struct UncheckedSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl TryFrom<UncheckedSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: UncheckedSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.symbol, raw.bars)
    }
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InsaneBar { index: i });
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(SeriesError::NotIncreasing { index: i });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(day: i64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn accepts_ordered_sane_bars() {
        let series = PriceSeries::new("TEST", vec![bar(0, 10.0), bar(1, 11.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().close, 11.0);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = PriceSeries::new("TEST", vec![bar(0, 10.0), bar(0, 11.0)]).unwrap_err();
        assert_eq!(err, SeriesError::NotIncreasing { index: 1 });
    }

    #[test]
    fn rejects_insane_bar() {
        let mut b = bar(1, 11.0);
        b.low = 12.0;
        let err = PriceSeries::new("TEST", vec![bar(0, 10.0), b]).unwrap_err();
        assert_eq!(err, SeriesError::InsaneBar { index: 1 });
    }

    #[test]
    fn deserialize_validates_like_new() {
        let ok = PriceSeries::new("TEST", vec![bar(0, 10.0), bar(1, 11.0)]).unwrap();
        let json = serde_json::to_string(&ok).unwrap();
        let back: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ok);

        let unordered = serde_json::json!({
            "symbol": "TEST",
            "bars": [bar(1, 11.0), bar(0, 10.0)],
        });
        let err = serde_json::from_value::<PriceSeries>(unordered).unwrap_err();
        assert!(err.to_string().contains("not strictly after"), "{err}");
    }
}
