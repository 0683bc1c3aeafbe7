//! Relative Strength Index (RSI).
//!
//! Gains and losses are Wilder-smoothed separately, seeded with their plain
//! average over the first `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: no movement → RSI = 50; avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0.

use super::atr::wilder_smooth;
use super::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let (gains, losses): (Vec<f64>, Vec<f64>) = std::iter::once((f64::NAN, f64::NAN))
            .chain(candles.windows(2).map(|w| {
                let ch = w[1].close - w[0].close;
                (ch.max(0.0), (-ch).max(0.0))
            }))
            .take(candles.len())
            .unzip();

        let avg_gain = wilder_smooth(&gains, self.period);
        let avg_loss = wilder_smooth(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    rsi_from_averages(g, l)
                }
            })
            .collect()
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (false, true) => 100.0,
        (true, false) => 0.0,
        (false, false) => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    }
}
