//! Scan service: the scanner behind a TTL cache, plus entry decisions.
//!
//! This is what a presentation layer talks to. Repeated scans of the same
//! universe under the same config are served from cache until the TTL
//! expires or `refresh` is called; concurrent identical scans share one
//! computation.

use crate::cache::ScanCache;
use crate::config::{ScanConfig, ScanKey};
use crate::scanner::{ScanError, ScanOutcome, Scanner};
use crate::shortlist::RankedShortlist;
use entryscan_core::data::{DataProvider, Universe};
use entryscan_core::domain::{DecisionRecord, ScoreRecord};
use entryscan_core::DecisionEngine;
use std::sync::Arc;
use tracing::info;

pub struct ScanService {
    scanner: Scanner,
    decisions: DecisionEngine,
    cache: ScanCache<ScanOutcome>,
}

impl ScanService {
    pub fn new(provider: Arc<dyn DataProvider>, config: ScanConfig) -> Result<Self, ScanError> {
        let cache = ScanCache::new(config.cache_ttl());
        let decisions = config.decision_engine();
        Ok(Self {
            scanner: Scanner::new(provider, config)?,
            decisions,
            cache,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        self.scanner.config()
    }

    pub fn scan_key(&self, universe: &Universe) -> ScanKey {
        self.config().scan_key(universe)
    }

    /// Cached scan with diagnostics.
    pub fn scan_outcome(&self, universe: &Universe) -> Result<Arc<ScanOutcome>, ScanError> {
        let key = self.scan_key(universe);
        self.cache
            .get_or_compute(&key, || self.scanner.scan(universe))
    }

    /// Cached scan, shortlist only.
    pub fn scan(&self, universe: &Universe) -> Result<RankedShortlist, ScanError> {
        self.scan_outcome(universe)
            .map(|outcome| outcome.shortlist.clone())
    }

    /// Discard any cached result for `universe` and scan again.
    pub fn refresh(&self, universe: &Universe) -> Result<Arc<ScanOutcome>, ScanError> {
        let key = self.scan_key(universe);
        self.cache.invalidate(&key);
        info!(provider = self.scanner.provider_name(), "manual refresh");
        self.scan_outcome(universe)
    }

    /// Decide on `record` at its own latest close.
    pub fn decide(&self, record: &ScoreRecord) -> DecisionRecord {
        self.decide_with_price(record, record.latest_close)
    }

    /// # Panics
    /// When `latest_price` is not a finite positive number.
    pub fn decide_with_price(&self, record: &ScoreRecord, latest_price: f64) -> DecisionRecord {
        self.decisions.decide(record, latest_price)
    }
}
