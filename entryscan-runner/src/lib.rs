//! EntryScan Runner: scan orchestration, ranking, configuration, result cache.
//!
//! This crate builds on `entryscan-core` to provide:
//! - Scan configuration (`ScanConfig`, TOML) and deterministic scan keys
//! - Concurrent scanner with per-fetch timeouts and per-instrument failure isolation
//! - Ranked shortlist policy (threshold, stable descending sort, size cap)
//! - TTL result cache with at most one in-flight computation per key
//! - `ScanService`, the scan / refresh / decide facade used by the CLI

pub mod cache;
pub mod config;
pub mod scanner;
pub mod service;
pub mod shortlist;

pub use cache::ScanCache;
pub use config::{ConfigError, ScanConfig, ScanKey, MAX_SHORTLIST};
pub use scanner::{
    scan, InstrumentError, ScanError, ScanOutcome, Scanner, SkippedInstrument,
};
pub use service::ScanService;
pub use shortlist::RankedShortlist;
