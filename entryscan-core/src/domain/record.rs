//! Per-scan output records.

use super::instrument::Instrument;
use serde::{Deserialize, Serialize};

/// Scored result for one instrument in one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub instrument: Instrument,
    pub latest_close: f64,
    /// Heuristic confidence in [0, 96].
    pub confidence: f64,
    pub momentum_latest: f64,
    pub in_demand_zone: bool,
    pub volume_spike: bool,
    pub gap_flag: bool,
    /// Volatility range at the latest bar, when the window has warmed up.
    pub volatility_latest: Option<f64>,
}

/// Discrete entry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Recommendation for a selected instrument. HOLD carries no risk levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub instrument: Instrument,
    pub signal: Signal,
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}
