//! Decision engine: BUY/HOLD plus fixed-percentage risk levels.
//!
//! BUY when confidence >= min_confidence. Stop-loss and take-profit are fixed
//! fractions of the entry price (1.5% / 6% by default, a 4:1 reward:risk ratio);
//! they are not derived from volatility.

use crate::domain::{DecisionRecord, ScoreRecord, Signal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            stop_loss_pct: 0.015,
            take_profit_pct: 0.06,
        }
    }
}

impl RiskParams {
    /// Reward:risk ratio implied by the percentages.
    pub fn reward_risk_ratio(&self) -> f64 {
        self.take_profit_pct / self.stop_loss_pct
    }

    pub fn stop_loss(&self, price: f64) -> f64 {
        price * (1.0 - self.stop_loss_pct)
    }

    pub fn take_profit(&self, price: f64) -> f64 {
        price * (1.0 + self.take_profit_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    min_confidence: f64,
    risk: RiskParams,
}

impl DecisionEngine {
    pub fn new(min_confidence: f64, risk: RiskParams) -> Self {
        Self {
            min_confidence,
            risk,
        }
    }

    pub fn signal_for(&self, confidence: f64) -> Signal {
        if confidence >= self.min_confidence {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }

    /// Decide on a selected record at `latest_price`.
    ///
    /// # Panics
    /// When `latest_price` is not a finite positive number. Callers obtain the
    /// price from a non-empty shortlist; anything else is a programming error.
    pub fn decide(&self, record: &ScoreRecord, latest_price: f64) -> DecisionRecord {
        assert!(
            latest_price.is_finite() && latest_price > 0.0,
            "decide() requires a finite positive latest price, got {latest_price}"
        );

        let signal = self.signal_for(record.confidence);
        let (stop_loss, take_profit) = match signal {
            Signal::Buy => (
                Some(self.risk.stop_loss(latest_price)),
                Some(self.risk.take_profit(latest_price)),
            ),
            Signal::Hold => (None, None),
        };

        DecisionRecord {
            instrument: record.instrument.clone(),
            signal,
            confidence: record.confidence,
            entry_price: latest_price,
            stop_loss,
            take_profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;
    use crate::indicators::assert_approx;

    fn record(confidence: f64) -> ScoreRecord {
        ScoreRecord {
            instrument: Instrument::new("TEST", "TEST.KL"),
            latest_close: 10.0,
            confidence,
            momentum_latest: 40.0,
            in_demand_zone: true,
            volume_spike: false,
            gap_flag: false,
            volatility_latest: Some(0.2),
        }
    }

    #[test]
    fn buy_sets_risk_levels() {
        let engine = DecisionEngine::new(85.0, RiskParams::default());
        let d = engine.decide(&record(90.0), 10.0);
        assert_eq!(d.signal, Signal::Buy);
        assert_approx(d.stop_loss.unwrap(), 9.85, 1e-9);
        assert_approx(d.take_profit.unwrap(), 10.6, 1e-9);
        assert_eq!(d.confidence, 90.0);
    }

    #[test]
    fn below_threshold_holds() {
        let engine = DecisionEngine::new(85.0, RiskParams::default());
        let d = engine.decide(&record(80.0), 10.0);
        assert_eq!(d.signal, Signal::Hold);
        assert!(d.stop_loss.is_none());
        assert!(d.take_profit.is_none());
    }

    #[test]
    fn threshold_is_inclusive() {
        let engine = DecisionEngine::new(85.0, RiskParams::default());
        assert_eq!(engine.signal_for(85.0), Signal::Buy);
    }

    #[test]
    fn default_reward_risk_is_four_to_one() {
        assert_approx(RiskParams::default().reward_risk_ratio(), 4.0, 1e-9);
    }

    #[test]
    #[should_panic(expected = "finite positive latest price")]
    fn missing_price_is_fatal() {
        DecisionEngine::new(85.0, RiskParams::default()).decide(&record(90.0), f64::NAN);
    }
}
