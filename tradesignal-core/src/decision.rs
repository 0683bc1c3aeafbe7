//! Decision & risk calculator.
//!
//! Maps a rule score to a signal category and, for directional categories,
//! derives a stop-loss and two take-profit levels scaled by the current ATR.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{AnalysisError, AnnotatedCandle, IndicatorKind};
use crate::rules::{Reason, ScoreResult};

/// Score at or beyond which a signal counts as strong.
pub const STRONG_THRESHOLD: i32 = 3;
/// Score at or beyond which a signal counts as directional at all.
pub const WEAK_THRESHOLD: i32 = 1;

/// Stop-loss distance in ATR multiples.
pub const STOP_LOSS_ATR: f64 = 1.5;
pub const TAKE_PROFIT_1_ATR: f64 = 1.5;
pub const TAKE_PROFIT_2_ATR: f64 = 3.0;

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalCategory {
    StrongBuy,
    WeakBuy,
    StrongSell,
    WeakSell,
    Neutral,
}

impl SignalCategory {
    /// First matching threshold wins: >= 3, >= 1, <= -3, <= -1, otherwise neutral.
    pub fn from_score(score: i32) -> Self {
        if score >= STRONG_THRESHOLD {
            Self::StrongBuy
        } else if score >= WEAK_THRESHOLD {
            Self::WeakBuy
        } else if score <= -STRONG_THRESHOLD {
            Self::StrongSell
        } else if score <= -WEAK_THRESHOLD {
            Self::WeakSell
        } else {
            Self::Neutral
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::StrongBuy | Self::WeakBuy => Some(Direction::Long),
            Self::StrongSell | Self::WeakSell => Some(Direction::Short),
            Self::Neutral => None,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.direction() == Some(Direction::Long)
    }

    pub fn is_sell(&self) -> bool {
        self.direction() == Some(Direction::Short)
    }

    /// Stable identifier, e.g. "STRONG_BUY".
    pub fn code(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::WeakBuy => "WEAK_BUY",
            Self::StrongSell => "STRONG_SELL",
            Self::WeakSell => "WEAK_SELL",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong buy",
            Self::WeakBuy => "Weak buy",
            Self::StrongSell => "Strong sell",
            Self::WeakSell => "Weak sell",
            Self::Neutral => "Wait / ranging",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Entry, stop and targets for a hypothetical position opened at `entry`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskTargets {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
}

impl RiskTargets {
    pub fn from_atr(entry: f64, atr: f64, direction: Direction) -> Self {
        let sign = match direction {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        };
        Self {
            entry,
            stop_loss: entry - sign * STOP_LOSS_ATR * atr,
            take_profit_1: entry + sign * TAKE_PROFIT_1_ATR * atr,
            take_profit_2: entry + sign * TAKE_PROFIT_2_ATR * atr,
        }
    }
}

/// Final output of one analysis. Both the raw `score` and the number of
/// reasons are kept; neither is designated "the" confidence value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub pair: String,
    pub as_of: DateTime<Utc>,
    pub category: SignalCategory,
    pub score: i32,
    pub reasons: Vec<Reason>,
    pub current_price: f64,
    pub atr: f64,
    pub targets: Option<RiskTargets>,
}

impl DecisionResult {
    /// Number of rules that fired.
    pub fn factor_count(&self) -> usize {
        self.reasons.len()
    }

    pub fn reason_texts(&self) -> Vec<String> {
        self.reasons.iter().map(|r| r.to_string()).collect()
    }
}

/// Turn a score on the candle at `index` into a decision.
///
/// ATR must be defined at that candle, whatever the category.
pub fn decide(
    pair: &str,
    last: &AnnotatedCandle,
    index: usize,
    score: ScoreResult,
) -> Result<DecisionResult, AnalysisError> {
    let atr = last.atr.ok_or(AnalysisError::IndicatorUndefined {
        indicator: IndicatorKind::Atr,
        index,
    })?;
    let current_price = last.close();
    let category = SignalCategory::from_score(score.score);
    let targets = category
        .direction()
        .map(|direction| RiskTargets::from_atr(current_price, atr, direction));

    Ok(DecisionResult {
        pair: pair.to_string(),
        as_of: last.candle.timestamp,
        category,
        score: score.score,
        reasons: score.reasons,
        current_price,
        atr,
        targets,
    })
}
