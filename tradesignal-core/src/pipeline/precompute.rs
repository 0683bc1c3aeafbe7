//! Indicator precomputation and candle annotation.
//!
//! All indicators are computed once per analysis, then folded into
//! `AnnotatedCandle`s so rules and renderers read plain fields.

use crate::domain::{AnnotatedCandle, Candle, IndicatorKind};
use crate::indicators::{
    Atr, Ema, Indicator, IndicatorValues, Macd, Rsi, ATR_PERIOD, EMA_LONG_PERIOD,
    EMA_SHORT_PERIOD, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD,
};

/// The engine's fixed indicator set, paired with the field each one fills.
pub fn engine_indicators() -> Vec<(IndicatorKind, Box<dyn Indicator>)> {
    vec![
        (IndicatorKind::Ema50, Box::new(Ema::new(EMA_SHORT_PERIOD))),
        (IndicatorKind::Ema200, Box::new(Ema::new(EMA_LONG_PERIOD))),
        (IndicatorKind::Rsi, Box::new(Rsi::new(RSI_PERIOD))),
        (
            IndicatorKind::Macd,
            Box::new(Macd::line(MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        ),
        (
            IndicatorKind::MacdSignal,
            Box::new(Macd::signal(MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        ),
        (IndicatorKind::Atr, Box::new(Atr::new(ATR_PERIOD))),
    ]
}

/// Compute every series in `indicators` over `candles`.
pub fn precompute_indicators(
    candles: &[Candle],
    indicators: &[(IndicatorKind, Box<dyn Indicator>)],
) -> IndicatorValues {
    let mut iv = IndicatorValues::new();
    for (kind, indicator) in indicators {
        let series = indicator.compute(candles);
        debug_assert_eq!(
            series.len(),
            candles.len(),
            "indicator '{}' produced {} values for {} candles",
            indicator.name(),
            series.len(),
            candles.len(),
        );
        iv.insert(*kind, series);
    }
    iv
}

/// Attach precomputed values to their candles.
pub fn annotate(
    candles: &[Candle],
    values: &IndicatorValues,
) -> Vec<AnnotatedCandle> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let mut annotated = AnnotatedCandle::bare(candle.clone());
            for kind in IndicatorKind::ALL {
                if let Some(v) = values.get(kind, i) {
                    annotated.set(kind, v);
                }
            }
            annotated
        })
        .collect()
}

/// Compute the largest lookback in an indicator set.
pub fn compute_warmup(indicators: &[(IndicatorKind, Box<dyn Indicator>)]) -> usize {
    indicators
        .iter()
        .map(|(_, i)| i.lookback())
        .max()
        .unwrap_or(0)
}
