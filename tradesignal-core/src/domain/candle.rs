//! Candle, the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, CandleProblem};

/// OHLCV candle for one instrument over one time bucket.
///
/// Series of candles are chronological ascending with no duplicate
/// timestamps. Volume is fractional because crypto venues report base-asset
/// volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Name of the first OHLCV field that is NaN or infinite, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Returns true if any OHLCV field is missing (NaN or infinite).
    pub fn is_void(&self) -> bool {
        self.non_finite_field().is_some()
    }
}

/// Reject series with missing fields or timestamps that do not strictly increase.
///
/// Runs before any indicator is computed; the first offending candle wins.
pub fn validate_series(candles: &[Candle]) -> Result<(), AnalysisError> {
    for (index, candle) in candles.iter().enumerate() {
        if let Some(field) = candle.non_finite_field() {
            return Err(AnalysisError::MalformedCandle {
                index,
                problem: CandleProblem::NonFinite { field },
            });
        }
        if index > 0 {
            let previous = candles[index - 1].timestamp;
            if candle.timestamp <= previous {
                return Err(AnalysisError::MalformedCandle {
                    index,
                    problem: CandleProblem::NonMonotonicTimestamp {
                        previous,
                        current: candle.timestamp,
                    },
                });
            }
        }
    }
    Ok(())
}
