//! Per-instrument analysis: series → indicators → zones → confidence.
//!
//! This is the unit of work the scanner runs once per instrument. It is pure
//! and holds no state between calls.

use crate::domain::{Instrument, PriceBar, PriceSeries, ScoreRecord, SeriesError};
use crate::indicators::{defined, volume_spike, Indicator, Momentum, VolatilityRange};
use crate::scoring::{ConfidenceScorer, ScoreInputs};
use crate::zone::{gap_flags, ZoneDetector};
use thiserror::Error;
use tracing::debug;

/// Series shorter than this are rejected before any indicator is computed.
pub const MIN_BARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient history: {bars} bars, need at least {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl From<SeriesError> for AnalysisError {
    fn from(e: SeriesError) -> Self {
        AnalysisError::InvalidSeries(e.to_string())
    }
}

/// Derived per-bar values for one series. Recomputed on every scan.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub momentum: Vec<f64>,
    pub volatility_range: Vec<f64>,
    pub liquidity_floor: Vec<f64>,
    pub in_demand_zone: Vec<bool>,
    pub gap_flag: Vec<bool>,
}

/// Indicator values at a single bar; `None` while warming up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub momentum: Option<f64>,
    pub volatility_range: Option<f64>,
    pub liquidity_floor: Option<f64>,
    pub in_demand_zone: bool,
    pub gap_flag: bool,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.momentum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.momentum.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<IndicatorPoint> {
        if index >= self.len() {
            return None;
        }
        Some(IndicatorPoint {
            momentum: defined(self.momentum[index]),
            volatility_range: defined(self.volatility_range[index]),
            liquidity_floor: defined(self.liquidity_floor[index]),
            in_demand_zone: self.in_demand_zone[index],
            gap_flag: self.gap_flag[index],
        })
    }

    pub fn latest(&self) -> Option<IndicatorPoint> {
        self.len().checked_sub(1).and_then(|i| self.at(i))
    }
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    momentum: Momentum,
    volatility: VolatilityRange,
    zones: ZoneDetector,
    scorer: ConfidenceScorer,
}

impl Analyzer {
    /// `momentum_window` drives both the oscillator and the volatility range;
    /// the zone tolerance and volume multiplier come from the scorer's weights.
    pub fn new(momentum_window: usize, zone_window: usize, scorer: ConfidenceScorer) -> Self {
        let tolerance = scorer.weights().zone_tolerance;
        Self {
            momentum: Momentum::new(momentum_window),
            volatility: VolatilityRange::new(momentum_window),
            zones: ZoneDetector::new(zone_window, tolerance),
            scorer,
        }
    }

    pub fn zones(&self) -> &ZoneDetector {
        &self.zones
    }

    pub fn scorer(&self) -> &ConfidenceScorer {
        &self.scorer
    }

    /// Minimum series length for the latest bar to have every indicator defined.
    pub fn required_bars(&self) -> usize {
        MIN_BARS
            .max(self.momentum.lookback() + 1)
            .max(self.zones.window() + 1)
    }

    pub fn indicators(&self, bars: &[PriceBar]) -> IndicatorSet {
        let liquidity_floor = self.zones.floor(bars);
        let in_demand_zone = self.zones.in_zone(bars, &liquidity_floor);
        IndicatorSet {
            momentum: self.momentum.compute(bars),
            volatility_range: self.volatility.compute(bars),
            liquidity_floor,
            in_demand_zone,
            gap_flag: gap_flags(bars),
        }
    }

    pub fn analyze(
        &self,
        instrument: &Instrument,
        series: &PriceSeries,
    ) -> Result<ScoreRecord, AnalysisError> {
        let required = self.required_bars();
        let bars = series.bars();
        let latest_bar = match bars.last() {
            Some(bar) if bars.len() >= required => bar,
            _ => {
                return Err(AnalysisError::InsufficientHistory {
                    bars: bars.len(),
                    required,
                })
            }
        };

        let set = self.indicators(bars);
        let latest = set.latest().ok_or(AnalysisError::InsufficientHistory {
            bars: bars.len(),
            required,
        })?;
        let momentum = latest.momentum.ok_or(AnalysisError::InsufficientHistory {
            bars: bars.len(),
            required,
        })?;

        let inputs = ScoreInputs {
            momentum,
            in_demand_zone: latest.in_demand_zone,
            gap_flag: latest.gap_flag,
            volume_spike: volume_spike(bars, self.scorer.weights().volume_spike_multiplier),
        };
        let confidence = self.scorer.score(&instrument.symbol, &inputs);

        debug!(
            symbol = %instrument.symbol,
            bars = bars.len(),
            momentum,
            in_zone = inputs.in_demand_zone,
            gap = inputs.gap_flag,
            volume_spike = inputs.volume_spike,
            confidence,
            "instrument analyzed"
        );

        Ok(ScoreRecord {
            instrument: instrument.clone(),
            latest_close: latest_bar.close,
            confidence,
            momentum_latest: momentum,
            in_demand_zone: inputs.in_demand_zone,
            volume_spike: inputs.volume_spike,
            gap_flag: inputs.gap_flag,
            volatility_latest: latest.volatility_range,
        })
    }
}
