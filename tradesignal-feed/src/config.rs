//! Feed configuration loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock setup: Binance, 4-hour candles, 500 of them, 5-minute cache.

use crate::provider::{pair_to_symbol, Timeframe};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Binance caps a single klines request at this many candles.
pub const MAX_LIMIT: usize = 1000;

/// Upper bound on retries after the first request.
pub const MAX_RETRIES: u32 = 10;

pub const DEFAULT_PAIRS: [&str; 7] = [
    "BTC/USDT", "ETH/USDT", "SOL/USDT", "XRP/USDT", "ADA/USDT", "BNB/USDT", "DOGE/USDT",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeframe: Timeframe,
    pub limit: usize,
    pub cache_ttl_secs: u64,
    pub pairs: Vec<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".into(),
            timeframe: Timeframe::H4,
            limit: 500,
            cache_ttl_secs: 300,
            pairs: DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl FeedConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {}",
                self.limit
            )));
        }
        if self.pairs.is_empty() {
            return Err(ConfigError::Invalid("pair list is empty".into()));
        }
        for pair in &self.pairs {
            pair_to_symbol(pair).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "max_retries must be at most {MAX_RETRIES}, got {}",
                self.max_retries
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
