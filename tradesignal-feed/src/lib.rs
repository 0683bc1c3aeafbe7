//! TradeSignal Feed: where candles come from.
//!
//! Providers behind the `CandleProvider` trait:
//! - `BinanceProvider`: public spot klines, with retries and a circuit breaker
//! - `CsvProvider`: local CSV files for offline runs and fixtures
//! - `CachedProvider`: TTL cache wrapping either of the above
//!
//! `FeedConfig` holds the TOML-loadable settings shared with the CLI.

pub mod binance;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod csv_file;
pub mod provider;

pub use binance::BinanceProvider;
pub use cache::CachedProvider;
pub use circuit_breaker::CircuitBreaker;
pub use config::{ConfigError, FeedConfig};
pub use csv_file::CsvProvider;
pub use provider::{pair_to_symbol, CandleProvider, FeedError, Timeframe};
