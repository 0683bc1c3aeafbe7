//! Candle provider trait and structured error types.
//!
//! The `CandleProvider` trait abstracts over candle sources (Binance, CSV
//! files) so the CLI can swap them and tests can mock them. Caching sits
//! above this trait; providers know nothing about it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tradesignal_core::Candle;

/// Structured error types for feed operations.
///
/// Displayable as-is in the CLI.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by exchange (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("hard stop: exchange has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid pair '{0}': expected BASE/QUOTE, e.g. BTC/USDT")]
    InvalidPair(String),

    #[error("unknown timeframe '{0}'")]
    InvalidTimeframe(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("feed error: {0}")]
    Other(String),
}

/// Candle interval, named by its exchange code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 11] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::H6,
        Timeframe::H12,
        Timeframe::D1,
        Timeframe::W1,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Self::M1 => 1,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H2 => 120,
            Self::H4 => 240,
            Self::H6 => 360,
            Self::H12 => 720,
            Self::D1 => 1_440,
            Self::W1 => 10_080,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::H4
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Timeframe {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.code() == s)
            .ok_or_else(|| FeedError::InvalidTimeframe(s.to_string()))
    }
}

/// Exchange symbol for a `BASE/QUOTE` pair: "BTC/USDT" → "BTCUSDT".
pub fn pair_to_symbol(pair: &str) -> Result<String, FeedError> {
    match pair.trim().split_once('/') {
        Some((base, quote))
            if !base.is_empty()
                && !quote.is_empty()
                && !quote.contains('/')
                && base.chars().chain(quote.chars()).all(|c| c.is_ascii_alphanumeric()) =>
        {
            Ok(format!("{base}{quote}").to_ascii_uppercase())
        }
        _ => Err(FeedError::InvalidPair(pair.to_string())),
    }
}

/// Trait for candle sources.
///
/// An empty `Vec` is a valid "no data" answer; the engine reports it as
/// insufficient data rather than the provider treating it as an error.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch up to `limit` most recent candles, oldest first.
    fn fetch(&self, pair: &str, timeframe: Timeframe, limit: usize)
        -> Result<Vec<Candle>, FeedError>;
}

impl<P: CandleProvider + ?Sized> CandleProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FeedError> {
        (**self).fetch(pair, timeframe, limit)
    }
}
