//! Scripted in-memory data provider shared by the runner integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use entryscan_core::data::{
    BarInterval, DataError, DataProvider, DataSource, FetchResult, LookbackPeriod, RawBar,
    Universe,
};
use entryscan_core::domain::Instrument;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// What the provider does for one symbol.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Calm drift, then a sharp drop onto the 20-bar floor on double volume.
    /// Scores 96 under the tight profile.
    Selloff,
    /// Steady uptrend with wide bars: no bonus fires. Scores 60 (tight).
    Uptrend,
    /// Only `n` bars.
    Short(usize),
    /// A bar whose low sits above its close.
    Malformed,
    NotFound,
    /// Block for this long before answering with a selloff.
    Hang(std::time::Duration),
}

pub struct ScriptedProvider {
    scripts: HashMap<String, Behavior>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    available: AtomicBool,
    delay: std::time::Duration,
}

impl ScriptedProvider {
    pub fn new(scripts: &[(&str, Behavior)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(s, b)| (s.to_string(), b.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            available: AtomicBool::new(true),
            delay: std::time::Duration::ZERO,
        }
    }

    /// Sleep before every fetch, to widen the window for concurrent callers.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most fetches that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Report the provider as blocked, like an open circuit breaker.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn script(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let bars = match self.scripts.get(symbol) {
            None | Some(Behavior::NotFound) => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            Some(Behavior::Selloff) => selloff_bars(),
            Some(Behavior::Uptrend) => uptrend_bars(),
            Some(Behavior::Short(n)) => selloff_bars().into_iter().take(*n).collect(),
            Some(Behavior::Malformed) => {
                let mut bars = uptrend_bars();
                bars[10].low = bars[10].close + 1.0;
                bars
            }
            Some(Behavior::Hang(d)) => {
                std::thread::sleep(*d);
                selloff_bars()
            }
        };
        Ok(bars)
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(
        &self,
        symbol: &str,
        _period: LookbackPeriod,
        _interval: BarInterval,
    ) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let bars = self.script(symbol);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let bars = bars?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> RawBar {
    RawBar {
        timestamp: Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap() + Duration::days(i as i64),
        open,
        high,
        low,
        close,
        volume,
        adj_close: None,
    }
}

pub fn selloff_bars() -> Vec<RawBar> {
    let mut bars: Vec<RawBar> = (0..40)
        .map(|i| {
            let close = 10.0 + 0.01 * (i % 5) as f64;
            bar(i, close, close + 0.05, close - 0.05, close, 1000.0)
        })
        .collect();
    bars.push(bar(40, 9.90, 9.95, 9.55, 9.56, 2000.0));
    bars
}

pub fn uptrend_bars() -> Vec<RawBar> {
    (0..41)
        .map(|i| {
            let close = 10.0 + 0.1 * i as f64;
            bar(i, close, close + 0.15, close - 0.15, close, 1000.0)
        })
        .collect()
}

/// Universe whose symbols double as display names.
pub fn universe(symbols: &[&str]) -> Universe {
    Universe::new(symbols.iter().map(|s| Instrument::new(*s, *s)).collect())
}
