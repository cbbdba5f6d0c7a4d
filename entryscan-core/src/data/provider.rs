//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! directory, synthetic) so the scanner can swap implementations and tests can
//! mock them. Providers return adapter-level `RawBar` rows; `normalize` turns
//! them into a validated `PriceSeries` before the core sees them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw OHLCV row from a provider (before normalization). Missing cells are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: Option<f64>,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("fetch timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider returned no bars for {symbol}")]
    EmptyResult { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("data error: {0}")]
    Other(String),
}

/// How far back a fetch reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LookbackPeriod {
    #[serde(rename = "1mo")]
    OneMonth,
    #[default]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl LookbackPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
        }
    }

    /// Calendar span of the period.
    pub fn duration(self) -> Duration {
        match self {
            LookbackPeriod::OneMonth => Duration::days(31),
            LookbackPeriod::ThreeMonths => Duration::days(92),
            LookbackPeriod::SixMonths => Duration::days(183),
            LookbackPeriod::OneYear => Duration::days(366),
            LookbackPeriod::TwoYears => Duration::days(731),
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1mo" => Ok(LookbackPeriod::OneMonth),
            "3mo" => Ok(LookbackPeriod::ThreeMonths),
            "6mo" => Ok(LookbackPeriod::SixMonths),
            "1y" => Ok(LookbackPeriod::OneYear),
            "2y" => Ok(LookbackPeriod::TwoYears),
            other => Err(format!("unknown lookback period '{other}' (expected 1mo|3mo|6mo|1y|2y)")),
        }
    }
}

/// Bar spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1h")]
    Hourly,
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl BarInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            BarInterval::Hourly => "1h",
            BarInterval::Daily => "1d",
            BarInterval::Weekly => "1wk",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            BarInterval::Hourly => Duration::hours(1),
            BarInterval::Daily => Duration::days(1),
            BarInterval::Weekly => Duration::weeks(1),
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(BarInterval::Hourly),
            "1d" => Ok(BarInterval::Daily),
            "1wk" => Ok(BarInterval::Weekly),
            other => Err(format!("unknown bar interval '{other}' (expected 1h|1d|1wk)")),
        }
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for data providers.
///
/// Implementations must be shareable across scan workers. Unknown symbols and
/// empty results are reported as errors, never as empty successes.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch OHLCV bars for a symbol over a lookback period at an interval.
    fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        interval: BarInterval,
    ) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}
