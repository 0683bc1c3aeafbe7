//! Moving Average Convergence/Divergence (MACD).
//!
//! Two series (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal), seeded on the first `signal` defined line values
//!
//! Lookback: line = slow - 1, signal = slow + signal - 2.

use super::ema::ema_of_series;
use super::indicator::Indicator;
use crate::domain::Candle;

/// Which MACD series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdSeries {
    Line,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    series: MacdSeries,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdSeries::Line, "macd")
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdSeries::Signal, "macd_signal")
    }

    fn build(fast: usize, slow: usize, signal: usize, series: MacdSeries, prefix: &str) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self {
            fast,
            slow,
            signal,
            series,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.series {
            MacdSeries::Line => self.slow - 1,
            MacdSeries::Signal => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (line, signal) = macd_of_series(&closes, self.fast, self.slow, self.signal);
        match self.series {
            MacdSeries::Line => line,
            MacdSeries::Signal => signal,
        }
    }
}

/// Compute the MACD line and its signal line from raw values.
pub fn macd_of_series(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>) {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);
    // NaN - x stays NaN, so the line inherits the slow EMA's warmup
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_of_series(&line, signal);
    (line, signal_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn macd_known_values() {
        // fast EMA(2): -, 10.5, 73/6, 217/18, 757/54, ...
        // slow EMA(3): -, -, 34/3, 35/3, 40/3, ...
        // line: 5/6, 7/18, 37/54
        // signal EMA(2) of line: seed mean(5/6, 7/18) = 11/18, then 107/162
        let candles = make_candles(&[10.0, 11.0, 13.0, 12.0, 15.0, 14.0]);
        let line = Macd::line(2, 3, 2).compute(&candles);
        let signal = Macd::signal(2, 3, 2).compute(&candles);

        assert!(line[1].is_nan());
        assert_approx(line[2], 5.0 / 6.0, DEFAULT_EPSILON);
        assert_approx(line[3], 7.0 / 18.0, DEFAULT_EPSILON);
        assert_approx(line[4], 37.0 / 54.0, DEFAULT_EPSILON);

        assert!(signal[2].is_nan());
        assert_approx(signal[3], 11.0 / 18.0, DEFAULT_EPSILON);
        assert_approx(signal[4], 107.0 / 162.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_default_warmup_boundaries() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let candles = make_candles(&closes);
        let line = Macd::line(12, 26, 9).compute(&candles);
        let signal = Macd::signal(12, 26, 9).compute(&candles);

        assert!(line[24].is_nan());
        assert!(!line[25].is_nan());
        assert!(signal[32].is_nan());
        assert!(!signal[33].is_nan());
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let candles = make_candles(&[50.0; 60]);
        let line = Macd::line(12, 26, 9).compute(&candles);
        let signal = Macd::signal(12, 26, 9).compute(&candles);
        assert_eq!(line[59], 0.0);
        assert_eq!(signal[59], 0.0);
    }

    #[test]
    fn macd_names_and_lookback() {
        let line = Macd::line(12, 26, 9);
        let signal = Macd::signal(12, 26, 9);
        assert_eq!(line.name(), "macd_12_26_9");
        assert_eq!(signal.name(), "macd_signal_12_26_9");
        assert_eq!(line.lookback(), 25);
        assert_eq!(signal.lookback(), 33);
    }

    #[test]
    #[should_panic(expected = "slow period must be > fast period")]
    fn macd_rejects_inverted_periods() {
        let _ = Macd::line(26, 12, 9);
    }
}
