//! Indicator library.
//!
//! EMA, RSI, MACD and ATR implement the `Indicator` trait. Each one maps a
//! candle series to a value series of the same length, with `f64::NAN` during
//! warmup. MACD is exposed as two named instances (line and signal), keeping
//! the single-series trait unchanged.
//!
//! The periods the engine uses are fixed constants, not configuration.

pub mod atr;
pub mod ema;
pub mod indicator;
pub mod macd;
pub mod rsi;

pub use atr::Atr;
pub use ema::Ema;
pub use indicator::{Indicator, IndicatorValues};
pub use macd::{Macd, MacdSeries};
pub use rsi::Rsi;

/// Short trend EMA, plotted with the price.
pub const EMA_SHORT_PERIOD: usize = 50;
/// Long trend EMA, used by the trend rule.
pub const EMA_LONG_PERIOD: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const ATR_PERIOD: usize = 14;

/// Create synthetic 4-hour candles from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for the first
/// candle), high = max(open,close) + 1.0, low = min(open,close) - 1.0,
/// volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    let data: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_candles(&data)
}

/// Create 4-hour candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};

    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Candle::new(
                base + Duration::hours(4 * i as i64),
                open,
                high,
                low,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
