//! Binance spot market-data provider.
//!
//! Fetches candles from the public `/api/v3/klines` endpoint. No API key is
//! needed. Handles retries with exponential backoff, Binance error payloads,
//! and the circuit breaker (418 means the IP is banned, 403 a WAF block).

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{FeedConfig, MAX_LIMIT, MAX_RETRIES};
use crate::provider::{pair_to_symbol, CandleProvider, FeedError, Timeframe};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tradesignal_core::Candle;

/// Binance error code for an unknown symbol.
const INVALID_SYMBOL_CODE: i64 = -1121;

/// Ceiling on a single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Error payload Binance attaches to 4xx answers.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl BinanceProvider {
    pub fn new(
        config: &FeedConfig,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tradesignal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: config.max_retries.min(MAX_RETRIES),
            base_delay: Duration::from_millis(500),
        })
    }

    /// Override the first backoff delay (doubles on each retry).
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    fn klines_url(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> String {
        format!(
            "{}/api/v3/klines?symbol={symbol}&interval={}&limit={limit}",
            self.base_url,
            timeframe.code()
        )
    }

    fn fetch_with_retry(&self, symbol: &str, url: &str) -> Result<Vec<Candle>, FeedError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                tracing::debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(FeedError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    tracing::warn!(symbol, error = %e, "request failed");
                    last_error = Some(FeedError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(FeedError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN || status.as_u16() == 418 {
                self.circuit_breaker.trip();
                return Err(FeedError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                tracing::warn!(symbol, retry_after, "rate limited");
                last_error = Some(FeedError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(FeedError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            if status.is_client_error() {
                let body = resp.text().unwrap_or_default();
                return Err(client_error(symbol, status, &body));
            }

            let payload: Value = resp.json().map_err(|e| {
                FeedError::ResponseFormatChanged(format!(
                    "failed to parse klines for {symbol}: {e}"
                ))
            })?;
            let candles = parse_klines(&payload)?;
            self.circuit_breaker.record_success();
            return Ok(candles);
        }

        Err(last_error.unwrap_or_else(|| FeedError::Other("max retries exceeded".into())))
    }
}

impl CandleProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, FeedError> {
        let symbol = pair_to_symbol(pair)?;
        let limit = limit.clamp(1, MAX_LIMIT);
        let url = self.klines_url(&symbol, timeframe, limit);
        tracing::debug!(pair, %timeframe, limit, "fetching klines");
        let candles = self.fetch_with_retry(&symbol, &url)?;
        tracing::debug!(pair, candles = candles.len(), "klines received");
        Ok(candles)
    }
}

/// Sleep before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped at
/// `MAX_BACKOFF`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}

/// Map a 4xx answer to a feed error, using Binance's error payload when present.
fn client_error(symbol: &str, status: reqwest::StatusCode, body: &str) -> FeedError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api) if api.code == INVALID_SYMBOL_CODE => FeedError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Ok(api) => FeedError::Other(format!(
            "HTTP {status} for {symbol}: {} ({})",
            api.msg, api.code
        )),
        Err(_) => FeedError::Other(format!("HTTP {status} for {symbol}")),
    }
}

/// Parse the klines payload: an array of
/// `[open_time_ms, "open", "high", "low", "close", "volume", close_time_ms, ...]`.
pub fn parse_klines(payload: &Value) -> Result<Vec<Candle>, FeedError> {
    let rows = payload
        .as_array()
        .ok_or_else(|| FeedError::ResponseFormatChanged("klines payload is not an array".into()))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            parse_kline(row)
                .map_err(|msg| FeedError::ResponseFormatChanged(format!("kline {i}: {msg}")))
        })
        .collect()
}

fn parse_kline(row: &Value) -> Result<Candle, String> {
    let fields = row.as_array().ok_or("row is not an array")?;
    if fields.len() < 6 {
        return Err(format!("expected at least 6 fields, got {}", fields.len()));
    }

    let open_time = fields[0].as_i64().ok_or("open time is not an integer")?;
    let timestamp = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| format!("open time out of range: {open_time}"))?;

    let num = |idx: usize, name: &str| -> Result<f64, String> {
        match &fields[idx] {
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| format!("{name} is not a number: {s:?}")),
            Value::Number(n) => n.as_f64().ok_or_else(|| format!("{name} is not a number")),
            _ => Err(format!("{name} has unexpected type")),
        }
    };

    Ok(Candle::new(
        timestamp,
        num(1, "open")?,
        num(2, "high")?,
        num(3, "low")?,
        num(4, "close")?,
        num(5, "volume")?,
    ))
}
