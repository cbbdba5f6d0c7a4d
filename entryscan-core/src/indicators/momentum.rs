//! Momentum oscillator (RSI-style, simple averages).
//!
//! gain = mean of positive close-to-close changes over the trailing `period` changes
//! loss = mean of |negative changes| over the same window
//! value = 100 - 100 / (1 + gain / loss)
//! Lookback: period (first `period` bars have no full window of changes).
//! Edge case: loss == 0 → 100, including a flat window.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
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

        // changes[i - 1] = close[i] - close[i - 1]
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        for (offset, window) in changes.windows(self.period).enumerate() {
            let mut gain = 0.0;
            let mut loss = 0.0;
            for &ch in window {
                if ch > 0.0 {
                    gain += ch;
                } else if ch < 0.0 {
                    loss -= ch;
                }
            }
            gain /= self.period as f64;
            loss /= self.period as f64;
            result[offset + self.period] = oscillator(gain, loss);
        }

        result
    }
}

fn oscillator(gain: f64, loss: f64) -> f64 {
    if loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + gain / loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn all_gains_reads_100() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Momentum::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn all_losses_reads_0() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Momentum::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn flat_window_reads_100() {
        let bars = make_bars(&[50.0; 6]);
        let result = Momentum::new(3).compute(&bars);
        assert_approx(result[4], 100.0, 1e-9);
    }

    #[test]
    fn uses_simple_average_of_trailing_window() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 at bar 3: gain=0.34/3, loss=0.73/3 → 100 - 100/(1 + 0.34/0.73)
        // period=3 at bar 4: gain=0.72/3, loss=0.73/3 → 100 - 100/(1 + 0.72/0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Momentum::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-9);
    }

    #[test]
    fn bounded_between_0_and_100() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Momentum::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate().skip(3) {
            assert!((0.0..=100.0).contains(&v), "momentum out of bounds at bar {i}: {v}");
        }
    }

    #[test]
    fn short_series_is_all_warmup() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        assert!(Momentum::new(3).compute(&bars).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn lookback_matches_period() {
        let m = Momentum::new(14);
        assert_eq!(m.lookback(), 14);
        assert_eq!(m.name(), "momentum_14");
    }
}
