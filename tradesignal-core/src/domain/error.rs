//! Structured error types for the analysis pipeline.
//!
//! Every stage failure aborts the whole invocation. Messages are diagnostic
//! only; presenting them to a user is the caller's job.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::annotated::IndicatorKind;

/// Coarse error category, as seen by callers deciding what to tell a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Too few candles, or an indicator still warming up at the evaluated candle.
    InsufficientData,
    /// A candle with a missing field or an out-of-order timestamp.
    MalformedCandle,
}

/// What is wrong with a malformed candle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleProblem {
    #[error("field '{field}' is missing or not finite")]
    NonFinite { field: &'static str },

    #[error("timestamp {current} does not follow {previous}")]
    NonMonotonicTimestamp {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: need at least {required} candles, got {actual}")]
    TooFewCandles { required: usize, actual: usize },

    #[error("insufficient data: {indicator} is undefined at candle {index}")]
    IndicatorUndefined {
        indicator: IndicatorKind,
        index: usize,
    },

    #[error("malformed candle at index {index}: {problem}")]
    MalformedCandle { index: usize, problem: CandleProblem },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooFewCandles { .. } | Self::IndicatorUndefined { .. } => {
                ErrorKind::InsufficientData
            }
            Self::MalformedCandle { .. } => ErrorKind::MalformedCandle,
        }
    }
}
