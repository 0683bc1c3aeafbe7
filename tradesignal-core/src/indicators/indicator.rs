//! The `Indicator` trait and the per-analysis store of computed series.

use crate::domain::{Candle, IndicatorKind};
use std::collections::HashMap;

/// A pure function from candle history to one value per candle.
///
/// The output has the same length as the input. Entries before the lookback
/// window is satisfied are `f64::NAN`. A value at candle t may only read
/// candles 0..=t; appending candles must never change earlier outputs.
pub trait Indicator: Send + Sync {
    /// Series name, e.g. "ema_200" or "macd_signal_12_26_9".
    fn name(&self) -> &str;

    /// Index of the first defined value on a gap-free series.
    fn lookback(&self) -> usize;

    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Computed series of one analysis, one per indicator field.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<IndicatorKind, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: IndicatorKind, values: Vec<f64>) {
        self.series.insert(kind, values);
    }

    /// Defined value of `kind` at candle `index`. Warmup NaN reads as `None`.
    pub fn get(&self, kind: IndicatorKind, index: usize) -> Option<f64> {
        self.series
            .get(&kind)
            .and_then(|s| s.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    pub fn series(&self, kind: IndicatorKind) -> Option<&[f64]> {
        self.series.get(&kind).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_reads_as_none() {
        let mut values = IndicatorValues::new();
        values.insert(IndicatorKind::Rsi, vec![f64::NAN, f64::NAN, 48.5, 51.0]);
        assert_eq!(values.get(IndicatorKind::Rsi, 0), None);
        assert_eq!(values.get(IndicatorKind::Rsi, 2), Some(48.5));
        assert_eq!(values.get(IndicatorKind::Rsi, 3), Some(51.0));
        assert_eq!(values.get(IndicatorKind::Rsi, 4), None);
        assert_eq!(values.series(IndicatorKind::Rsi).map(<[f64]>::len), Some(4));
    }

    #[test]
    fn absent_kind() {
        let mut values = IndicatorValues::new();
        assert!(values.is_empty());
        values.insert(IndicatorKind::Atr, vec![2.0]);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(IndicatorKind::Macd, 0), None);
        assert!(values.series(IndicatorKind::Macd).is_none());
    }
}
