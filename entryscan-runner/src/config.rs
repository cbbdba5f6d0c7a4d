//! Serializable scan configuration.

use entryscan_core::data::{BarInterval, LookbackPeriod, Universe};
use entryscan_core::scoring::Perturbation;
use entryscan_core::{Analyzer, ConfidenceScorer, DecisionEngine, RiskParams, ScoringProfile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on shortlist length.
pub const MAX_SHORTLIST: usize = 8;

/// Scope label for perturbation draws, so other seeded consumers of the same
/// master seed never collide with scoring.
const PERTURBATION_SCOPE: &str = "confidence";

/// Content-addressed identifier of a scan (hash of everything that affects its result).
pub type ScanKey = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce a scan apart from the universe and provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub lookback_period: LookbackPeriod,
    pub bar_interval: BarInterval,

    /// Selection threshold; `None` uses the profile's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,

    pub shortlist_size: usize,
    pub momentum_window: usize,
    pub zone_window: usize,
    pub profile: ScoringProfile,

    pub enable_stochastic_perturbation: bool,
    pub perturbation_seed: u64,

    pub fetch_timeout_secs: u64,
    pub worker_threads: usize,
    pub cache_ttl_secs: u64,

    pub risk: RiskParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_period: LookbackPeriod::ThreeMonths,
            bar_interval: BarInterval::Daily,
            min_confidence: None,
            shortlist_size: MAX_SHORTLIST,
            momentum_window: 14,
            zone_window: 20,
            profile: ScoringProfile::Tight,
            enable_stochastic_perturbation: false,
            perturbation_seed: 42,
            fetch_timeout_secs: 15,
            worker_threads: 4,
            cache_ttl_secs: 300,
            risk: RiskParams::default(),
        }
    }
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if let Some(min) = self.min_confidence {
            if !(0.0..=100.0).contains(&min) {
                return invalid(format!("min_confidence must be within [0, 100], got {min}"));
            }
        }
        if !(1..=MAX_SHORTLIST).contains(&self.shortlist_size) {
            return invalid(format!(
                "shortlist_size must be within 1..={MAX_SHORTLIST}, got {}",
                self.shortlist_size
            ));
        }
        if self.momentum_window < 2 {
            return invalid(format!("momentum_window must be >= 2, got {}", self.momentum_window));
        }
        if self.zone_window < 2 {
            return invalid(format!("zone_window must be >= 2, got {}", self.zone_window));
        }
        if self.fetch_timeout_secs == 0 {
            return invalid("fetch_timeout_secs must be > 0".into());
        }
        if self.worker_threads == 0 {
            return invalid("worker_threads must be > 0".into());
        }
        let RiskParams {
            stop_loss_pct,
            take_profit_pct,
        } = self.risk;
        if !(stop_loss_pct > 0.0 && stop_loss_pct < 1.0) {
            return invalid(format!("risk.stop_loss_pct must be within (0, 1), got {stop_loss_pct}"));
        }
        if !(take_profit_pct > 0.0 && take_profit_pct.is_finite()) {
            return invalid(format!("risk.take_profit_pct must be > 0, got {take_profit_pct}"));
        }
        Ok(())
    }

    /// The threshold actually applied: explicit value or the profile default.
    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence
            .unwrap_or_else(|| self.profile.weights().default_min_confidence)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn scorer(&self) -> ConfidenceScorer {
        let weights = self.profile.weights();
        let scorer = ConfidenceScorer::new(weights);
        if self.enable_stochastic_perturbation {
            scorer.with_perturbation(Perturbation::new(
                weights.perturbation,
                self.perturbation_seed,
                PERTURBATION_SCOPE,
            ))
        } else {
            scorer
        }
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.momentum_window, self.zone_window, self.scorer())
    }

    pub fn decision_engine(&self) -> DecisionEngine {
        DecisionEngine::new(self.effective_min_confidence(), self.risk)
    }

    /// Deterministic key for a scan of `universe` under this config.
    ///
    /// Operational knobs (timeouts, thread count, TTL, risk levels) do not
    /// change the shortlist and are excluded.
    pub fn scan_key(&self, universe: &Universe) -> ScanKey {
        #[derive(Serialize)]
        struct KeyMaterial<'a> {
            universe: &'a Universe,
            lookback_period: LookbackPeriod,
            bar_interval: BarInterval,
            momentum_window: usize,
            zone_window: usize,
            profile: ScoringProfile,
            min_confidence: f64,
            shortlist_size: usize,
            perturbation_seed: Option<u64>,
        }

        let material = KeyMaterial {
            universe,
            lookback_period: self.lookback_period,
            bar_interval: self.bar_interval,
            momentum_window: self.momentum_window,
            zone_window: self.zone_window,
            profile: self.profile,
            min_confidence: self.effective_min_confidence(),
            shortlist_size: self.shortlist_size,
            perturbation_seed: self
                .enable_stochastic_perturbation
                .then_some(self.perturbation_seed),
        };
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_vec(&material).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
