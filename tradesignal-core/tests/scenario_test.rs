//! End-to-end scenarios through `analyze` on fixed synthetic series.

use chrono::{Duration, TimeZone, Utc};
use tradesignal_core::{
    analyze, AnalysisError, Candle, ErrorKind, Reason, SignalCategory,
};

/// 4-hour candles from closes: open = previous close, high/low one unit
/// outside the body.
fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                base + Duration::hours(4 * i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

#[test]
fn flat_series_is_neutral() {
    let candles = candles_from_closes(&[100.0; 300]);
    let analysis = analyze("BTC/USDT", &candles).unwrap();
    let d = &analysis.decision;

    let last = analysis.series.last().unwrap();
    assert_eq!(last.ema_200, Some(100.0));
    assert_eq!(last.rsi, Some(50.0));
    assert_eq!(last.macd, Some(0.0));
    assert_eq!(last.macd_signal, Some(0.0));

    assert_eq!(d.score, 0);
    assert!(d.reasons.is_empty());
    assert_eq!(d.category, SignalCategory::Neutral);
    assert!(d.targets.is_none());
    assert_eq!(d.current_price, 100.0);
    assert_eq!(d.atr, 2.0);
}

#[test]
fn accelerating_rise_is_weak_sell() {
    // Strictly increasing from 100 to 300 over 201 candles
    let closes: Vec<f64> = (0..201)
        .map(|i| 100.0 + 200.0 * (i as f64 / 200.0).powi(2))
        .collect();
    assert_eq!(closes[200], 300.0);
    let analysis = analyze("ETH/USDT", &candles_from_closes(&closes)).unwrap();
    let d = &analysis.decision;

    let last = analysis.series.last().unwrap();
    let prev = &analysis.series[199];
    assert!(last.close() > last.ema_200.unwrap());
    assert_eq!(last.rsi, Some(100.0));
    assert!(prev.macd.unwrap() > prev.macd_signal.unwrap());
    assert!(last.macd.unwrap() > last.macd_signal.unwrap());

    assert_eq!(d.reasons, vec![Reason::BullishTrend, Reason::Overbought]);
    assert_eq!(d.score, -1);
    assert_eq!(d.category, SignalCategory::WeakSell);

    let t = d.targets.expect("sell categories carry targets");
    assert_eq!(t.entry, 300.0);
    assert!(t.stop_loss > t.entry);
    assert!(t.take_profit_2 < t.take_profit_1 && t.take_profit_1 < t.entry);
}

#[test]
fn oversold_bounce_in_downtrend_is_strong_buy() {
    let closes: Vec<f64> = (0..224)
        .map(|i| 300.0 - 0.6 * i as f64 + 8.0 * (i as f64 / 6.0).sin())
        .collect();
    let analysis = analyze("SOL/USDT", &candles_from_closes(&closes)).unwrap();
    let d = &analysis.decision;

    assert_eq!(
        d.reasons,
        vec![Reason::BearishTrend, Reason::Oversold, Reason::MacdCrossUp]
    );
    assert_eq!(d.score, 3);
    assert_eq!(d.factor_count(), 3);
    assert_eq!(d.category, SignalCategory::StrongBuy);

    let t = d.targets.unwrap();
    assert!(t.stop_loss < t.entry);
    assert!(t.take_profit_1 > t.entry);
}

#[test]
fn overbought_rollover_in_uptrend_is_strong_sell() {
    let closes: Vec<f64> = (0..243)
        .map(|i| 100.0 + 0.6 * i as f64 + 8.0 * (i as f64 / 6.0).sin())
        .collect();
    let analysis = analyze("XRP/USDT", &candles_from_closes(&closes)).unwrap();
    let d = &analysis.decision;

    assert_eq!(
        d.reasons,
        vec![Reason::BullishTrend, Reason::Overbought, Reason::MacdCrossDown]
    );
    assert_eq!(d.score, -3);
    assert_eq!(d.category, SignalCategory::StrongSell);
    assert!(d.targets.unwrap().stop_loss > d.current_price);
}

#[test]
fn single_candle_produces_no_decision() {
    let err = analyze("BTC/USDT", &candles_from_closes(&[100.0])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert!(matches!(err, AnalysisError::TooFewCandles { actual: 1, .. }));
}

#[test]
fn empty_series_does_not_panic() {
    let err = analyze("BTC/USDT", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn same_input_gives_identical_output() {
    let closes: Vec<f64> = (0..320)
        .map(|i| 250.0 + 30.0 * (i as f64 / 17.0).sin() + 0.1 * i as f64)
        .collect();
    let candles = candles_from_closes(&closes);
    let a = analyze("BNB/USDT", &candles).unwrap();
    let b = analyze("BNB/USDT", &candles).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.decision.current_price.to_bits(),
        b.decision.current_price.to_bits()
    );
    assert_eq!(a.decision.atr.to_bits(), b.decision.atr.to_bits());
}

#[test]
fn parallel_analyses_match_serial() {
    let series: Vec<Vec<Candle>> = (0..4)
        .map(|k| {
            let closes: Vec<f64> = (0..260)
                .map(|i| 100.0 + k as f64 * 10.0 + 5.0 * ((i + k * 7) as f64 / 9.0).sin())
                .collect();
            candles_from_closes(&closes)
        })
        .collect();

    let serial: Vec<_> = series
        .iter()
        .map(|c| analyze("PAIR", c).unwrap())
        .collect();

    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = series
            .iter()
            .map(|c| s.spawn(move || analyze("PAIR", c).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(serial, parallel);
}
