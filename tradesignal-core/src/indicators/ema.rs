//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1),
//! evaluated as EMA[t-1] + alpha * (close[t] - EMA[t-1]) so a constant input stays exact.
//! Seed: EMA[period-1] = SMA of first `period` close values.
//! Lookback: period - 1.

use super::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// EMA of a pre-extracted series, alpha = 2 / (period + 1).
///
/// Leading NaN values are skipped, which lets MACD smooth its own line.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    seeded_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Exponential smoothing seeded with the SMA of the first `period` defined
/// values. Shared by EMA and Wilder smoothing, which differ only in alpha.
///
/// The seed window starts at the first non-NaN input. A NaN inside the seed
/// window leaves the whole output undefined; a NaN after it ends the series.
pub(crate) fn seeded_smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return out;
    };
    if period == 0 || start + period > n {
        return out;
    }

    let seed_window = &values[start..start + period];
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut level = seed_window.iter().sum::<f64>() / period as f64;
    out[start + period - 1] = level;

    for (slot, &x) in out[start + period..].iter_mut().zip(&values[start + period..]) {
        if x.is_nan() {
            break;
        }
        level += alpha * (x - level);
        *slot = level;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&candles);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2: SMA(10,11,12) = 11.0
        // EMA[3] = 11 + 0.5*(13-11) = 12.0
        // EMA[4] = 12 + 0.5*(14-12) = 13.0
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&candles);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_shorter_than_period_is_all_nan() {
        let candles = make_candles(&[10.0, 11.0]);
        let result = Ema::new(3).compute(&candles);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_constant_input_is_exact() {
        let candles = make_candles(&[100.0; 250]);
        let result = Ema::new(200).compute(&candles);
        assert_eq!(result[199], 100.0);
        assert_eq!(result[249], 100.0);
    }

    #[test]
    fn ema_of_series_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 2.0, 4.0, 6.0, 8.0];
        let result = ema_of_series(&values, 2);
        assert!(result[2].is_nan());
        // Seed at index 3: mean(2, 4) = 3; alpha = 2/3
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 3.0 + (2.0 / 3.0) * 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_series_nan_after_seed_taints_rest() {
        let values = [10.0, 11.0, 12.0, f64::NAN, 14.0];
        let result = ema_of_series(&values, 3);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(200).lookback(), 199);
        assert_eq!(Ema::new(1).lookback(), 0);
    }
}
