//! Scanner: fetch, analyze and rank every instrument in a universe.
//!
//! Work items are independent, so they run on a dedicated rayon pool. The
//! pool's indexed `par_iter` keeps results in universe order no matter which
//! fetch finishes first; ranking then relies on a stable sort, so concurrency
//! never changes the shortlist.
//!
//! Fetches run on a second pool of the same size, so a provider that hangs
//! pins at most `worker_threads` threads no matter how many scans or
//! refreshes follow. While those threads are stuck, queued fetches time out
//! too.
//!
//! Every per-instrument failure (fetch error or timeout, short history,
//! malformed bars) becomes a `SkippedInstrument`. Only a scan where *every*
//! instrument failed to fetch surfaces as `ScanError::ProviderUnavailable`.

use crate::config::ScanConfig;
use crate::shortlist::RankedShortlist;
use entryscan_core::data::{normalize, DataError, DataProvider, FetchResult, Universe};
use entryscan_core::domain::{Instrument, ScoreRecord};
use entryscan_core::{AnalysisError, Analyzer};
use rayon::prelude::*;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why one instrument was left out of a scan. Never aborts the scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstrumentError {
    #[error("insufficient history: {bars} bars, need at least {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl From<AnalysisError> for InstrumentError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InsufficientHistory { bars, required } => {
                InstrumentError::InsufficientHistory { bars, required }
            }
            AnalysisError::InvalidSeries(msg) => InstrumentError::InvalidSeries(msg),
        }
    }
}

impl From<DataError> for InstrumentError {
    fn from(e: DataError) -> Self {
        InstrumentError::DataUnavailable(e.to_string())
    }
}

/// Scan-level failures. Clone so a shared in-flight scan can hand the same
/// error to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("universe is empty")]
    EmptyUniverse,

    #[error("data provider unavailable: all {attempted} instruments failed to fetch")]
    ProviderUnavailable { attempted: usize },

    #[error("invalid scan config: {0}")]
    InvalidConfig(String),

    #[error("worker pool: {0}")]
    WorkerPool(String),

    #[error("scan computation panicked")]
    ComputationPanicked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedInstrument {
    pub instrument: Instrument,
    pub error: InstrumentError,
}

/// Full result of one scan: the shortlist plus diagnostics.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub shortlist: RankedShortlist,
    /// Every successfully scored instrument, in universe order.
    pub scored: Vec<ScoreRecord>,
    pub skipped: Vec<SkippedInstrument>,
    pub elapsed: Duration,
}

pub struct Scanner {
    provider: Arc<dyn DataProvider>,
    config: ScanConfig,
    analyzer: Analyzer,
    pool: rayon::ThreadPool,
    fetch_pool: rayon::ThreadPool,
}

impl Scanner {
    /// Validates `config` and builds the worker pool.
    pub fn new(provider: Arc<dyn DataProvider>, config: ScanConfig) -> Result<Self, ScanError> {
        config
            .validate()
            .map_err(|e| ScanError::InvalidConfig(e.to_string()))?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("entryscan-worker-{i}"))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;
        let fetch_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("entryscan-fetch-{i}"))
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;
        Ok(Self {
            provider,
            analyzer: config.analyzer(),
            config,
            pool,
            fetch_pool,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn scan(&self, universe: &Universe) -> Result<ScanOutcome, ScanError> {
        if universe.is_empty() {
            return Err(ScanError::EmptyUniverse);
        }
        let start = Instant::now();

        let results: Vec<(Instrument, Result<ScoreRecord, InstrumentError>)> =
            self.pool.install(|| {
                universe
                    .instruments()
                    .par_iter()
                    .map(|inst| (inst.clone(), self.process(inst)))
                    .collect()
            });

        let attempted = results.len();
        let mut scored = Vec::with_capacity(attempted);
        let mut skipped = Vec::new();
        for (instrument, result) in results {
            match result {
                Ok(record) => scored.push(record),
                Err(error) => {
                    warn!(symbol = %instrument.symbol, reason = %error, "instrument skipped");
                    skipped.push(SkippedInstrument { instrument, error });
                }
            }
        }

        if scored.is_empty()
            && skipped
                .iter()
                .all(|s| matches!(s.error, InstrumentError::DataUnavailable(_)))
        {
            return Err(ScanError::ProviderUnavailable { attempted });
        }

        let min_confidence = self.config.effective_min_confidence();
        let shortlist = RankedShortlist::rank(&scored, min_confidence, self.config.shortlist_size);
        let elapsed = start.elapsed();

        if shortlist.is_empty() {
            info!(min_confidence, "no instrument met the confidence threshold");
        }
        info!(
            provider = self.provider.name(),
            attempted,
            scored = scored.len(),
            skipped = skipped.len(),
            shortlisted = shortlist.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            shortlist,
            scored,
            skipped,
            elapsed,
        })
    }

    fn process(&self, instrument: &Instrument) -> Result<ScoreRecord, InstrumentError> {
        if !self.provider.is_available() {
            return Err(DataError::CircuitBreakerTripped.into());
        }
        let fetched = self.fetch_with_timeout(&instrument.symbol)?;
        debug!(symbol = %instrument.symbol, rows = fetched.bars.len(), source = ?fetched.source, "fetched");
        let series = normalize(&instrument.symbol, fetched.bars)?;
        Ok(self.analyzer.analyze(instrument, &series)?)
    }

    /// Run the fetch on the fetch pool and give up after the configured
    /// timeout, queueing included. An abandoned fetch finishes in the
    /// background and its result is dropped.
    fn fetch_with_timeout(&self, symbol: &str) -> Result<FetchResult, InstrumentError> {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::clone(&self.provider);
        let owned = symbol.to_string();
        let period = self.config.lookback_period;
        let interval = self.config.bar_interval;

        self.fetch_pool.spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send(provider.fetch(&owned, period, interval));
        });

        match rx.recv_timeout(self.config.fetch_timeout()) {
            Ok(result) => Ok(result?),
            Err(RecvTimeoutError::Timeout) => Err(DataError::Timeout {
                secs: self.config.fetch_timeout_secs,
            }
            .into()),
            Err(RecvTimeoutError::Disconnected) => Err(InstrumentError::DataUnavailable(
                "fetch thread exited without a result".into(),
            )),
        }
    }
}

/// One-shot scan: build a scanner for `config` and return only the shortlist.
pub fn scan(
    provider: Arc<dyn DataProvider>,
    universe: &Universe,
    config: &ScanConfig,
) -> Result<RankedShortlist, ScanError> {
    Scanner::new(provider, config.clone())?
        .scan(universe)
        .map(|outcome| outcome.shortlist)
}
