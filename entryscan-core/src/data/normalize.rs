//! Normalization of provider rows into a validated `PriceSeries`.
//!
//! Adapters disagree on ordering, duplicates, missing cells and whether prices
//! are split/dividend adjusted. Everything is reconciled here so the analysis
//! pipeline only ever sees the fixed PriceBar shape:
//! - rows with any missing OHLC cell are dropped (holidays, halted sessions)
//! - a missing volume becomes 0
//! - when an adjusted close is present, OHLC are scaled by adj_close / close
//! - rows are sorted by timestamp; duplicate timestamps keep the last row
//! - the result must satisfy the PriceBar invariants, otherwise `InvalidSeries`

use super::provider::RawBar;
use crate::analysis::AnalysisError;
use crate::domain::{PriceBar, PriceSeries};
use tracing::debug;

pub fn normalize(symbol: &str, raw: Vec<RawBar>) -> Result<PriceSeries, AnalysisError> {
    let total = raw.len();
    let mut bars: Vec<PriceBar> = raw
        .into_iter()
        .filter(|r| !(r.open.is_nan() || r.high.is_nan() || r.low.is_nan() || r.close.is_nan()))
        .map(adjust)
        .collect();
    let dropped = total - bars.len();

    bars.sort_by_key(|b| b.timestamp);
    // Keep the last row for each timestamp: reverse, dedup (keeps first), reverse.
    bars.reverse();
    bars.dedup_by_key(|b| b.timestamp);
    bars.reverse();

    if dropped > 0 {
        debug!(symbol, dropped, kept = bars.len(), "dropped incomplete rows");
    }

    Ok(PriceSeries::new(symbol, bars)?)
}

fn adjust(r: RawBar) -> PriceBar {
    let ratio = match r.adj_close {
        Some(adj) if adj.is_finite() && adj > 0.0 && r.close > 0.0 => adj / r.close,
        _ => 1.0,
    };
    PriceBar {
        timestamp: r.timestamp,
        open: r.open * ratio,
        high: r.high * ratio,
        low: r.low * ratio,
        close: r.close * ratio,
        volume: if r.volume.is_nan() { 0.0 } else { r.volume },
    }
}
