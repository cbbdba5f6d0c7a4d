//! CSV directory provider: one `{SYMBOL}.csv` file per instrument.
//!
//! Header names are matched case-insensitively so exports from different
//! tools load without editing: `date|timestamp|datetime`, `open`, `high`,
//! `low`, `close`, `volume`, and optionally `adj close|adj_close|adjclose`.
//! Files are read at their native interval; only the lookback period is
//! applied, measured back from the last row.

use super::provider::{
    BarInterval, DataError, DataProvider, DataSource, FetchResult, LookbackPeriod, RawBar,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::PathBuf;

pub struct CsvProvider {
    dir: PathBuf,
}

#[derive(Debug, Default)]
struct Columns {
    timestamp: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
    adj_close: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut cols = Columns::default();
        for (i, h) in headers.iter().enumerate() {
            match h.trim().to_ascii_lowercase().as_str() {
                "date" | "timestamp" | "datetime" => cols.timestamp = Some(i),
                "open" => cols.open = Some(i),
                "high" => cols.high = Some(i),
                "low" => cols.low = Some(i),
                "close" => cols.close = Some(i),
                "volume" => cols.volume = Some(i),
                "adj close" | "adj_close" | "adjclose" => cols.adj_close = Some(i),
                _ => {}
            }
        }
        cols
    }

    fn require(idx: Option<usize>, name: &str) -> Result<usize, DataError> {
        idx.ok_or_else(|| DataError::Parse(format!("missing '{name}' column")))
    }
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::Parse(format!("{}: {e}", path.display())))?
            .clone();
        let cols = Columns::from_headers(&headers);
        let ts_idx = Columns::require(cols.timestamp, "date")?;
        let open_idx = Columns::require(cols.open, "open")?;
        let high_idx = Columns::require(cols.high, "high")?;
        let low_idx = Columns::require(cols.low, "low")?;
        let close_idx = Columns::require(cols.close, "close")?;

        let mut bars = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataError::Parse(format!("row {}: {e}", line + 2)))?;
            let ts_raw = record.get(ts_idx).unwrap_or_default();
            let timestamp = parse_timestamp(ts_raw).ok_or_else(|| {
                DataError::Parse(format!("row {}: bad timestamp '{ts_raw}'", line + 2))
            })?;
            let num = |idx: Option<usize>| -> f64 {
                idx.and_then(|i| record.get(i))
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            };
            bars.push(RawBar {
                timestamp,
                open: num(Some(open_idx)),
                high: num(Some(high_idx)),
                low: num(Some(low_idx)),
                close: num(Some(close_idx)),
                volume: num(cols.volume),
                adj_close: cols.adj_close.map(|i| num(Some(i))).filter(|v| !v.is_nan()),
            });
        }

        Ok(bars)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        period: LookbackPeriod,
        _interval: BarInterval,
    ) -> Result<FetchResult, DataError> {
        let mut bars = self.read(symbol)?;
        let Some(last) = bars.iter().map(|b| b.timestamp).max() else {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        };
        let cutoff = last - period.duration();
        bars.retain(|b| b.timestamp > cutoff);

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}
