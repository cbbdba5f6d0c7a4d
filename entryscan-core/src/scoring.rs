//! Confidence scoring.
//!
//! confidence = clamp(base + Σ bonuses + perturbation, 0, 96)
//!
//! Bonuses are additive and independent: momentum below 45, demand zone,
//! two-bar gap, volume spike. The optional perturbation is a uniform draw from
//! a per-symbol seeded RNG, so a scan is reproducible for a given seed.

use crate::rng::RngHierarchy;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scores never reach 100.
pub const CONFIDENCE_CAP: f64 = 96.0;

/// Momentum readings strictly below this earn the momentum bonus.
pub const MOMENTUM_THRESHOLD: f64 = 45.0;

/// Named weight sets. Each corresponds to one variant of the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringProfile {
    /// Base 60, +22 / +20 / +15 / +12, 1.3× volume, 1.5% zone tolerance.
    #[default]
    Tight,
    /// Base 50, +25 / +25 / +15 / +10, 1.2× volume, 1% zone tolerance.
    Classic,
}

impl ScoringProfile {
    pub fn weights(self) -> ScoringWeights {
        match self {
            ScoringProfile::Tight => ScoringWeights {
                base: 60.0,
                momentum_bonus: 22.0,
                zone_bonus: 20.0,
                gap_bonus: 15.0,
                volume_bonus: 12.0,
                volume_spike_multiplier: 1.3,
                zone_tolerance: 0.015,
                default_min_confidence: 83.0,
                perturbation: PerturbationRange { low: 0.0, high: 8.0 },
            },
            ScoringProfile::Classic => ScoringWeights {
                base: 50.0,
                momentum_bonus: 25.0,
                zone_bonus: 25.0,
                gap_bonus: 15.0,
                volume_bonus: 10.0,
                volume_spike_multiplier: 1.2,
                zone_tolerance: 0.01,
                default_min_confidence: 85.0,
                perturbation: PerturbationRange { low: 3.0, high: 12.0 },
            },
        }
    }
}

impl std::str::FromStr for ScoringProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tight" => Ok(ScoringProfile::Tight),
            "classic" => Ok(ScoringProfile::Classic),
            other => Err(format!("unknown scoring profile '{other}' (expected tight|classic)")),
        }
    }
}

/// Inclusive bounds of the uniform perturbation draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerturbationRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub base: f64,
    pub momentum_bonus: f64,
    pub zone_bonus: f64,
    pub gap_bonus: f64,
    pub volume_bonus: f64,
    pub volume_spike_multiplier: f64,
    pub zone_tolerance: f64,
    pub default_min_confidence: f64,
    pub perturbation: PerturbationRange,
}

/// Latest-bar conditions feeding the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub momentum: f64,
    pub in_demand_zone: bool,
    pub gap_flag: bool,
    pub volume_spike: bool,
}

/// Seeded source for the optional perturbation term.
#[derive(Debug, Clone)]
pub struct Perturbation {
    range: PerturbationRange,
    seeds: RngHierarchy,
    scope: String,
}

impl Perturbation {
    pub fn new(range: PerturbationRange, seed: u64, scope: impl Into<String>) -> Self {
        assert!(
            range.low <= range.high,
            "perturbation range is inverted: [{}, {}]",
            range.low,
            range.high
        );
        Self {
            range,
            seeds: RngHierarchy::new(seed),
            scope: scope.into(),
        }
    }

    /// Draw the perturbation for `symbol`. Same seed, scope and symbol → same value.
    pub fn draw(&self, symbol: &str) -> f64 {
        let mut rng = self.seeds.rng_for(&self.scope, symbol);
        rng.gen_range(self.range.low..=self.range.high)
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
    perturbation: Option<Perturbation>,
}

impl ConfidenceScorer {
    /// Deterministic scorer (no perturbation).
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            perturbation: None,
        }
    }

    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = Some(perturbation);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn is_perturbed(&self) -> bool {
        self.perturbation.is_some()
    }

    /// Base plus every applicable bonus, before perturbation and capping.
    pub fn raw_score(&self, inputs: &ScoreInputs) -> f64 {
        let w = &self.weights;
        let mut score = w.base;
        if inputs.momentum < MOMENTUM_THRESHOLD {
            score += w.momentum_bonus;
        }
        if inputs.in_demand_zone {
            score += w.zone_bonus;
        }
        if inputs.gap_flag {
            score += w.gap_bonus;
        }
        if inputs.volume_spike {
            score += w.volume_bonus;
        }
        score
    }

    /// Final confidence in [0, 96].
    pub fn score(&self, symbol: &str, inputs: &ScoreInputs) -> f64 {
        let noise = self
            .perturbation
            .as_ref()
            .map_or(0.0, |p| p.draw(symbol));
        (self.raw_score(inputs) + noise).clamp(0.0, CONFIDENCE_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> ScoreInputs {
        ScoreInputs {
            momentum: 60.0,
            in_demand_zone: false,
            gap_flag: false,
            volume_spike: false,
        }
    }

    #[test]
    fn base_only_when_no_condition_holds() {
        let scorer = ConfidenceScorer::new(ScoringProfile::Tight.weights());
        assert_eq!(scorer.score("X", &quiet()), 60.0);
        let scorer = ConfidenceScorer::new(ScoringProfile::Classic.weights());
        assert_eq!(scorer.score("X", &quiet()), 50.0);
    }

    #[test]
    fn tight_profile_matches_original_weights() {
        let scorer = ConfidenceScorer::new(ScoringProfile::Tight.weights());
        let inputs = ScoreInputs {
            momentum: 40.0,
            in_demand_zone: true,
            ..quiet()
        };
        // 60 + 22 + 20
        assert_eq!(scorer.score("X", &inputs), 96.0);
        let inputs = ScoreInputs {
            momentum: 40.0,
            ..quiet()
        };
        assert_eq!(scorer.score("X", &inputs), 82.0);
    }

    #[test]
    fn momentum_threshold_is_strict() {
        let scorer = ConfidenceScorer::new(ScoringProfile::Classic.weights());
        let at = ScoreInputs {
            momentum: 45.0,
            ..quiet()
        };
        let below = ScoreInputs {
            momentum: 44.99,
            ..quiet()
        };
        assert_eq!(scorer.score("X", &at), 50.0);
        assert_eq!(scorer.score("X", &below), 75.0);
    }

    #[test]
    fn capped_at_96() {
        let scorer = ConfidenceScorer::new(ScoringProfile::Classic.weights());
        let all = ScoreInputs {
            momentum: 10.0,
            in_demand_zone: true,
            gap_flag: true,
            volume_spike: true,
        };
        assert_eq!(scorer.raw_score(&all), 125.0);
        assert_eq!(scorer.score("X", &all), CONFIDENCE_CAP);
    }

    #[test]
    fn perturbation_is_seeded_and_bounded() {
        let weights = ScoringProfile::Classic.weights();
        let a = ConfidenceScorer::new(weights)
            .with_perturbation(Perturbation::new(weights.perturbation, 7, "scan"));
        let b = ConfidenceScorer::new(weights)
            .with_perturbation(Perturbation::new(weights.perturbation, 7, "scan"));
        for symbol in ["A", "B", "C", "1155.KL"] {
            let sa = a.score(symbol, &quiet());
            assert_eq!(sa, b.score(symbol, &quiet()));
            assert!((53.0..=62.0).contains(&sa), "{symbol}: {sa}");
        }
        assert!(a.is_perturbed());
    }

    #[test]
    fn perturbation_never_exceeds_cap() {
        let weights = ScoringProfile::Tight.weights();
        let scorer = ConfidenceScorer::new(weights)
            .with_perturbation(Perturbation::new(weights.perturbation, 1, "scan"));
        let strong = ScoreInputs {
            momentum: 10.0,
            in_demand_zone: true,
            gap_flag: false,
            volume_spike: false,
        };
        assert!(scorer.score("Z", &strong) <= CONFIDENCE_CAP);
    }

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!("Tight".parse::<ScoringProfile>(), Ok(ScoringProfile::Tight));
        assert_eq!("classic".parse::<ScoringProfile>(), Ok(ScoringProfile::Classic));
        assert!("loose".parse::<ScoringProfile>().is_err());
    }
}
