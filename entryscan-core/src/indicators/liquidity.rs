//! Liquidity floor: rolling minimum Low over the prior `window` bars.
//!
//! floor[t] = min(low[t-window..t]), the current bar excluded.
//! Lookback: window.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct LiquidityFloor {
    window: usize,
    name: String,
}

impl LiquidityFloor {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "liquidity floor window must be >= 1");
        Self {
            window,
            name: format!("floor_{window}"),
        }
    }
}

impl Indicator for LiquidityFloor {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for (t, slot) in result.iter_mut().enumerate().skip(self.window) {
            *slot = bars[(t - self.window)..t]
                .iter()
                .map(|b| b.low)
                .fold(f64::INFINITY, f64::min);
        }

        result
    }
}
