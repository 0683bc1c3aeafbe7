//! Rule evaluator: scores the last two candles of an annotated series.
//!
//! Three mutually exclusive rule pairs run in a fixed order (trend, momentum,
//! MACD crossover). Each pair fires at most one branch; equality fires
//! neither. The order only affects the order of the emitted reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{AnalysisError, AnnotatedCandle, IndicatorKind};

/// RSI strictly below this reads as oversold.
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI strictly above this reads as overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Why the score moved. One entry per rule branch that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    BullishTrend,
    BearishTrend,
    Oversold,
    Overbought,
    MacdCrossUp,
    MacdCrossDown,
}

impl Reason {
    /// Score contribution of this branch.
    pub fn delta(&self) -> i32 {
        match self {
            Self::BullishTrend => 1,
            Self::BearishTrend => -1,
            Self::Oversold => 2,
            Self::Overbought => -2,
            Self::MacdCrossUp => 2,
            Self::MacdCrossDown => -2,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::BullishTrend => "price above EMA 200 (bullish trend)",
            Self::BearishTrend => "price below EMA 200 (bearish trend)",
            Self::Oversold => "RSI oversold (strong buy opportunity)",
            Self::Overbought => "RSI overbought (reversal risk)",
            Self::MacdCrossUp => "bullish MACD crossover",
            Self::MacdCrossDown => "bearish MACD crossover",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Signed score plus the reasons behind it, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: i32,
    pub reasons: Vec<Reason>,
}

impl ScoreResult {
    fn record(&mut self, reason: Option<Reason>) {
        if let Some(reason) = reason {
            self.score += reason.delta();
            self.reasons.push(reason);
        }
    }

    /// Number of rules that fired.
    pub fn factor_count(&self) -> usize {
        self.reasons.len()
    }

    pub fn reason_texts(&self) -> Vec<String> {
        self.reasons.iter().map(|r| r.to_string()).collect()
    }
}

/// Trend rule: close against the long EMA.
pub fn trend_rule(close: f64, ema_long: f64) -> Option<Reason> {
    if close > ema_long {
        Some(Reason::BullishTrend)
    } else if close < ema_long {
        Some(Reason::BearishTrend)
    } else {
        None
    }
}

/// Momentum rule: RSI outside the [30, 70] band.
pub fn momentum_rule(rsi: f64) -> Option<Reason> {
    if rsi < RSI_OVERSOLD {
        Some(Reason::Oversold)
    } else if rsi > RSI_OVERBOUGHT {
        Some(Reason::Overbought)
    } else {
        None
    }
}

/// MACD crossover rule over `(macd, signal)` readings of two consecutive candles.
pub fn macd_cross_rule(prev: (f64, f64), last: (f64, f64)) -> Option<Reason> {
    let (prev_macd, prev_signal) = prev;
    let (macd, signal) = last;
    if macd > signal && prev_macd <= prev_signal {
        Some(Reason::MacdCrossUp)
    } else if macd < signal && prev_macd >= prev_signal {
        Some(Reason::MacdCrossDown)
    } else {
        None
    }
}

fn require(
    candle: &AnnotatedCandle,
    index: usize,
    indicator: IndicatorKind,
) -> Result<f64, AnalysisError> {
    candle
        .get(indicator)
        .ok_or(AnalysisError::IndicatorUndefined { indicator, index })
}

/// Score the final candle of `series` against the one before it.
///
/// The last candle must carry EMA_200, RSI, MACD and MACD_SIGNAL; the previous
/// candle must carry MACD and MACD_SIGNAL.
pub fn evaluate(series: &[AnnotatedCandle]) -> Result<ScoreResult, AnalysisError> {
    let n = series.len();
    if n < 2 {
        return Err(AnalysisError::TooFewCandles {
            required: 2,
            actual: n,
        });
    }
    let (prev_index, last_index) = (n - 2, n - 1);
    let (prev, last) = (&series[prev_index], &series[last_index]);

    let ema_long = require(last, last_index, IndicatorKind::Ema200)?;
    let rsi = require(last, last_index, IndicatorKind::Rsi)?;
    let macd = require(last, last_index, IndicatorKind::Macd)?;
    let signal = require(last, last_index, IndicatorKind::MacdSignal)?;
    let prev_macd = require(prev, prev_index, IndicatorKind::Macd)?;
    let prev_signal = require(prev, prev_index, IndicatorKind::MacdSignal)?;

    let mut result = ScoreResult::default();
    result.record(trend_rule(last.close(), ema_long));
    result.record(momentum_rule(rsi));
    result.record(macd_cross_rule((prev_macd, prev_signal), (macd, signal)));
    Ok(result)
}
