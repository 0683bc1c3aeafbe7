//! CSV candle source for offline runs and fixtures.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. The timestamp is
//! RFC 3339 or epoch milliseconds. Empty price/volume cells are read as
//! missing (NaN) and left for the engine to reject, so a gap is reported
//! with its candle index instead of being silently dropped.

use crate::provider::{pair_to_symbol, CandleProvider, FeedError, Timeframe};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tradesignal_core::Candle;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

#[derive(Debug, Clone)]
enum Location {
    /// One file serves every pair.
    File(PathBuf),
    /// `{dir}/{SYMBOL}_{timeframe}.csv`, falling back to `{dir}/{SYMBOL}.csv`.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CsvProvider {
    location: Location,
}

impl CsvProvider {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Directory(dir.into()),
        }
    }

    /// File or directory, chosen by what `path` points at.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::directory(path)
        } else {
            Self::file(path)
        }
    }

    fn resolve(&self, pair: &str, timeframe: Timeframe) -> Result<PathBuf, FeedError> {
        match &self.location {
            Location::File(path) => Ok(path.clone()),
            Location::Directory(dir) => {
                let symbol = pair_to_symbol(pair)?;
                [
                    dir.join(format!("{symbol}_{}.csv", timeframe.code())),
                    dir.join(format!("{symbol}.csv")),
                ]
                .into_iter()
                .find(|p| p.is_file())
                .ok_or(FeedError::SymbolNotFound { symbol })
            }
        }
    }
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FeedError> {
        let path = self.resolve(pair, timeframe)?;
        tracing::debug!(pair, path = %path.display(), "reading candles from csv");
        let mut candles = read_candles_from_path(&path)?;
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }
}

pub fn read_candles_from_path(path: &Path) -> Result<Vec<Candle>, FeedError> {
    let file = std::fs::File::open(path)?;
    read_candles(file)
}

/// Read every row of a candle CSV, in file order.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, FeedError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();

    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            FeedError::ResponseFormatChanged(format!(
                "row {}: unreadable timestamp {:?}",
                i + 1,
                row.timestamp
            ))
        })?;
        candles.push(Candle::new(
            timestamp,
            row.open.unwrap_or(f64::NAN),
            row.high.unwrap_or(f64::NAN),
            row.low.unwrap_or(f64::NAN),
            row.close.unwrap_or(f64::NAN),
            row.volume.unwrap_or(f64::NAN),
        ));
    }

    Ok(candles)
}

/// RFC 3339 first, then integer epoch milliseconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}
