//! Demand-zone and price-gap detection.
//!
//! A bar is in a demand zone when its close sits within `tolerance` above the
//! liquidity floor (rolling minimum Low of the prior `window` bars). A gap is a
//! two-bar discontinuity: the current range does not overlap the range of the
//! bar two positions back.

use crate::domain::PriceBar;
use crate::indicators::{Indicator, LiquidityFloor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accepted range for the zone tolerance.
pub const TOLERANCE_RANGE: std::ops::RangeInclusive<f64> = 0.01..=0.015;

/// A bar flagged in-zone, for chart overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMarker {
    pub timestamp: DateTime<Utc>,
    pub floor: f64,
    pub close: f64,
}

#[derive(Debug, Clone)]
pub struct ZoneDetector {
    floor: LiquidityFloor,
    tolerance: f64,
}

impl ZoneDetector {
    pub fn new(window: usize, tolerance: f64) -> Self {
        assert!(
            TOLERANCE_RANGE.contains(&tolerance),
            "zone tolerance must be within [0.01, 0.015], got {tolerance}"
        );
        Self {
            floor: LiquidityFloor::new(window),
            tolerance,
        }
    }

    pub fn window(&self) -> usize {
        self.floor.lookback()
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Liquidity floor per bar (NaN for the first `window` bars).
    pub fn floor(&self, bars: &[PriceBar]) -> Vec<f64> {
        self.floor.compute(bars)
    }

    /// In-zone flag per bar given a precomputed floor. Undefined floors never flag.
    pub fn in_zone(&self, bars: &[PriceBar], floor: &[f64]) -> Vec<bool> {
        bars.iter()
            .zip(floor)
            .map(|(bar, &f)| !f.is_nan() && bar.close <= f * (1.0 + self.tolerance))
            .collect()
    }

    /// Every in-zone bar with its floor.
    pub fn markers(&self, bars: &[PriceBar]) -> Vec<ZoneMarker> {
        let floor = self.floor(bars);
        self.in_zone(bars, &floor)
            .into_iter()
            .enumerate()
            .filter(|(_, flagged)| *flagged)
            .map(|(i, _)| ZoneMarker {
                timestamp: bars[i].timestamp,
                floor: floor[i],
                close: bars[i].close,
            })
            .collect()
    }
}

/// Two-bar gap flag per bar. The first two bars are never flagged.
pub fn gap_flags(bars: &[PriceBar]) -> Vec<bool> {
    bars.iter()
        .enumerate()
        .map(|(t, bar)| {
            t >= 2 && {
                let prior = &bars[t - 2];
                bar.low > prior.high || bar.high < prior.low
            }
        })
        .collect()
}
