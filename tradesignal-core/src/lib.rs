//! TradeSignal Core: deterministic signal scoring over OHLCV candles.
//!
//! This crate contains the engine and nothing else:
//! - Domain types (candles, annotated candles, structured errors)
//! - Indicator library (EMA, RSI, MACD, ATR) with NaN warmup and no look-ahead
//! - Rule evaluator over the last two candles
//! - Decision & risk calculator (signal category, ATR-scaled targets)
//! - Pipeline orchestrator tying the stages together
//!
//! No I/O happens here. Fetching candles and presenting results belong to
//! the caller.

pub mod decision;
pub mod domain;
pub mod indicators;
pub mod pipeline;
pub mod rules;

pub use decision::{DecisionResult, Direction, RiskTargets, SignalCategory};
pub use domain::{AnalysisError, AnnotatedCandle, Candle, ErrorKind, IndicatorKind};
pub use pipeline::{analyze, Analysis};
pub use rules::{Reason, ScoreResult};
