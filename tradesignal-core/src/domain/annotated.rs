//! Candles extended with the engine's indicator readings.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::candle::Candle;

/// The six indicator fields carried by an annotated candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorKind {
    #[serde(rename = "EMA_50")]
    Ema50,
    #[serde(rename = "EMA_200")]
    Ema200,
    Rsi,
    Macd,
    MacdSignal,
    Atr,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::Ema50,
        IndicatorKind::Ema200,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::Atr,
    ];

    /// Column label, e.g. "EMA_200" or "MACD_SIGNAL".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ema50 => "EMA_50",
            Self::Ema200 => "EMA_200",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::MacdSignal => "MACD_SIGNAL",
            Self::Atr => "ATR",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candle plus its indicator values at the same index.
///
/// Each field is `None` until its lookback window is satisfied. Values are
/// computed only from candles at or before this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCandle {
    #[serde(flatten)]
    pub candle: Candle,
    pub ema_50: Option<f64>,
    pub ema_200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub atr: Option<f64>,
}

impl AnnotatedCandle {
    /// A candle with every indicator still undefined.
    pub fn bare(candle: Candle) -> Self {
        Self {
            candle,
            ema_50: None,
            ema_200: None,
            rsi: None,
            macd: None,
            macd_signal: None,
            atr: None,
        }
    }

    pub fn close(&self) -> f64 {
        self.candle.close
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        match kind {
            IndicatorKind::Ema50 => self.ema_50,
            IndicatorKind::Ema200 => self.ema_200,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::MacdSignal => self.macd_signal,
            IndicatorKind::Atr => self.atr,
        }
    }

    /// Store a raw series value; NaN marks warmup and becomes `None`.
    pub fn set(&mut self, kind: IndicatorKind, value: f64) {
        let value = (!value.is_nan()).then_some(value);
        match kind {
            IndicatorKind::Ema50 => self.ema_50 = value,
            IndicatorKind::Ema200 => self.ema_200 = value,
            IndicatorKind::Rsi => self.rsi = value,
            IndicatorKind::Macd => self.macd = value,
            IndicatorKind::MacdSignal => self.macd_signal = value,
            IndicatorKind::Atr => self.atr = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle() -> Candle {
        Candle::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap(),
            10.0,
            11.0,
            9.0,
            10.5,
            7.25,
        )
    }

    #[test]
    fn bare_candle_has_no_indicators() {
        let ac = AnnotatedCandle::bare(candle());
        for kind in IndicatorKind::ALL {
            assert_eq!(ac.get(kind), None, "{kind} should be undefined");
        }
    }

    #[test]
    fn set_maps_nan_to_none() {
        let mut ac = AnnotatedCandle::bare(candle());
        ac.set(IndicatorKind::Rsi, 55.0);
        ac.set(IndicatorKind::Atr, f64::NAN);
        assert_eq!(ac.get(IndicatorKind::Rsi), Some(55.0));
        assert_eq!(ac.get(IndicatorKind::Atr), None);
    }

    #[test]
    fn labels() {
        assert_eq!(IndicatorKind::Ema200.to_string(), "EMA_200");
        assert_eq!(IndicatorKind::MacdSignal.to_string(), "MACD_SIGNAL");
    }

    #[test]
    fn serializes_flat_with_nulls() {
        let mut ac = AnnotatedCandle::bare(candle());
        ac.set(IndicatorKind::Ema50, 10.25);
        let json = serde_json::to_value(&ac).unwrap();
        assert_eq!(json["close"], 10.5);
        assert_eq!(json["ema_50"], 10.25);
        assert!(json["ema_200"].is_null());
    }
}
