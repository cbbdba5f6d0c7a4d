//! EntryScan Core: price series, indicators, demand zones, confidence scoring
//! and entry decisions.
//!
//! This crate holds everything that runs per instrument:
//! - Domain types (bars, series, instruments, score and decision records)
//! - Indicators (momentum oscillator, volatility range, liquidity floor, volume spike)
//! - Demand zone and gap detection
//! - Confidence scoring with selectable profiles and optional seeded perturbation
//! - Entry decisions with fixed-percentage stop-loss / take-profit levels
//! - Data providers (Yahoo Finance, CSV directory, synthetic) and normalization
//!
//! Scanning a whole universe concurrently lives in `entryscan-runner`.

pub mod analysis;
pub mod data;
pub mod decision;
pub mod domain;
pub mod indicators;
pub mod rng;
pub mod scoring;
pub mod zone;

pub use analysis::{AnalysisError, Analyzer, IndicatorPoint, IndicatorSet, MIN_BARS};
pub use decision::{DecisionEngine, RiskParams};
pub use scoring::{ConfidenceScorer, Perturbation, ScoringProfile, ScoringWeights};
