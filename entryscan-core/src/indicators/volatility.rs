//! Volatility range (ATR-style, simple average of true range).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! Range at bar t = mean(TR[t-period+1..=t]).
//! Lookback: period (bars 0..period are undefined).

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct VolatilityRange {
    period: usize,
    name: String,
}

impl VolatilityRange {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volatility period must be >= 1");
        Self {
            period,
            name: format!("volatility_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let hl = bar.high - bar.low;
        if i == 0 {
            tr.push(hl);
        } else {
            let pc = bars[i - 1].close;
            tr.push(hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()));
        }
    }
    tr
}

impl Indicator for VolatilityRange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        let tr = true_range(bars);
        for (t, slot) in result.iter_mut().enumerate().skip(self.period) {
            let window = &tr[(t + 1 - self.period)..=t];
            *slot = window.iter().sum::<f64>() / self.period as f64;
        }

        result
    }
}
