//! Pipeline orchestrator: `Raw → Annotated → Scored → Decided`.
//!
//! Each stage consumes the previous one and either advances or fails the
//! whole invocation. Nothing is cached between calls.

pub mod precompute;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decision::{decide, DecisionResult};
use crate::domain::{validate_series, AnalysisError, AnnotatedCandle, Candle};
use crate::rules::{evaluate, ScoreResult};

pub use precompute::{annotate, compute_warmup, engine_indicators, precompute_indicators};

/// Two candles are needed for the crossover comparison.
pub const MIN_CANDLES: usize = 2;

/// Everything one analysis produces: the decision, plus the annotated series
/// so a chart can overlay EMA_50/EMA_200 without recomputing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub decision: DecisionResult,
    pub series: Vec<AnnotatedCandle>,
}

/// Stage 0: candles as received.
#[derive(Debug, Clone, Copy)]
pub struct RawSeries<'a> {
    pair: &'a str,
    candles: &'a [Candle],
}

impl<'a> RawSeries<'a> {
    pub fn new(pair: &'a str, candles: &'a [Candle]) -> Self {
        Self { pair, candles }
    }

    /// Validate the candles and compute the indicator set.
    pub fn annotate(self) -> Result<AnnotatedSeries, AnalysisError> {
        if self.candles.len() < MIN_CANDLES {
            return Err(AnalysisError::TooFewCandles {
                required: MIN_CANDLES,
                actual: self.candles.len(),
            });
        }
        validate_series(self.candles)?;

        let indicators = engine_indicators();
        let values = precompute_indicators(self.candles, &indicators);
        let series = annotate(self.candles, &values);
        debug!(pair = self.pair, candles = series.len(), "annotated series");

        Ok(AnnotatedSeries {
            pair: self.pair.to_string(),
            series,
        })
    }
}

/// Stage 1: candles with indicator fields.
#[derive(Debug, Clone)]
pub struct AnnotatedSeries {
    pair: String,
    series: Vec<AnnotatedCandle>,
}

impl AnnotatedSeries {
    pub fn candles(&self) -> &[AnnotatedCandle] {
        &self.series
    }

    pub fn score(self) -> Result<ScoredSeries, AnalysisError> {
        let score = evaluate(&self.series)?;
        debug!(
            pair = %self.pair,
            score = score.score,
            factors = score.factor_count(),
            "scored last candle"
        );
        Ok(ScoredSeries {
            pair: self.pair,
            series: self.series,
            score,
        })
    }
}

/// Stage 2: series plus the rule score of its last candle.
#[derive(Debug, Clone)]
pub struct ScoredSeries {
    pair: String,
    series: Vec<AnnotatedCandle>,
    score: ScoreResult,
}

impl ScoredSeries {
    pub fn score_result(&self) -> &ScoreResult {
        &self.score
    }

    pub fn decide(self) -> Result<Analysis, AnalysisError> {
        let index = self.series.len() - 1;
        let decision = decide(&self.pair, &self.series[index], index, self.score)?;
        debug!(
            pair = %decision.pair,
            category = %decision.category,
            price = decision.current_price,
            atr = decision.atr,
            "decided"
        );
        Ok(Analysis {
            decision,
            series: self.series,
        })
    }
}

/// Run the whole pipeline on one candle series.
///
/// `pair` is an opaque label carried into the result.
pub fn analyze(pair: &str, candles: &[Candle]) -> Result<Analysis, AnalysisError> {
    RawSeries::new(pair, candles).annotate()?.score()?.decide()
}
