//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! Lookback: period (TR needs a previous close, then `period` TR values to seed).

use super::ema::seeded_smooth;
use super::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series.
/// TR[0] is NaN: without a previous close it is not a true range.
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; candles.len()];

    for (i, pair) in candles.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let h = cur.high;
        let l = cur.low;
        let pc = prev.close;
        tr[i + 1] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Wilder smoothing, alpha = 1 / period, seeded with the mean of the first
/// `period` defined values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    seeded_smooth(values, period, 1.0 / period as f64)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        wilder_smooth(&true_range(candles), self.period)
    }
}
