//! Plain-text rendering of analyses for the terminal.

use std::io::{self, Write};

use tradesignal_core::{Analysis, AnnotatedCandle, DecisionResult, RiskTargets};
use tradesignal_feed::Timeframe;

const NEUTRAL_MESSAGE: &str = "market unclear, better to wait";

/// Full report for one pair: header, setup block, reasons, optional tail table.
pub fn write_analysis<W: Write>(
    out: &mut W,
    analysis: &Analysis,
    timeframe: Timeframe,
    tail: usize,
) -> io::Result<()> {
    let d = &analysis.decision;

    writeln!(
        out,
        "{} · {} · {}",
        d.pair,
        timeframe,
        d.as_of.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out, "Price:    {:.4}", d.current_price)?;
    writeln!(out, "Signal:   {} ({})", d.category.label(), d.category)?;
    writeln!(out, "Score:    {}   Factors: {}", d.score, d.factor_count())?;
    writeln!(out, "ATR:      {:.4}", d.atr)?;
    writeln!(out)?;

    match &d.targets {
        Some(t) if d.category.is_buy() => write_setup(out, "Buy setup", t)?,
        Some(t) => write_setup(out, "Short setup", t)?,
        None => writeln!(out, "{NEUTRAL_MESSAGE}")?,
    }

    writeln!(out)?;
    writeln!(out, "Reasons")?;
    if d.reasons.is_empty() {
        writeln!(out, "  (no rule fired)")?;
    }
    for reason in &d.reasons {
        writeln!(out, "  - {reason}")?;
    }

    if tail > 0 {
        writeln!(out)?;
        write_tail(out, &analysis.series, tail)?;
    }
    Ok(())
}

fn write_setup<W: Write>(out: &mut W, title: &str, t: &RiskTargets) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "  Entry:          {:.4}", t.entry)?;
    writeln!(out, "  Stop-loss:      {:.4}", t.stop_loss)?;
    writeln!(out, "  Take-profit 1:  {:.4}", t.take_profit_1)?;
    writeln!(out, "  Take-profit 2:  {:.4}", t.take_profit_2)
}

fn write_tail<W: Write>(out: &mut W, series: &[AnnotatedCandle], tail: usize) -> io::Result<()> {
    writeln!(
        out,
        "{:<17} {:>12} {:>12} {:>12} {:>7} {:>10} {:>10} {:>10}",
        "time", "close", "ema50", "ema200", "rsi", "macd", "signal", "atr"
    )?;
    let start = series.len().saturating_sub(tail);
    for c in &series[start..] {
        writeln!(
            out,
            "{:<17} {:>12.4} {:>12} {:>12} {:>7} {:>10} {:>10} {:>10}",
            c.candle.timestamp.format("%Y-%m-%d %H:%M"),
            c.close(),
            cell(c.ema_50, 4),
            cell(c.ema_200, 4),
            cell(c.rsi, 2),
            cell(c.macd, 4),
            cell(c.macd_signal, 4),
            cell(c.atr, 4),
        )?;
    }
    Ok(())
}

fn cell(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

/// One summary line per pair for `scan`.
pub fn write_scan_line<W: Write>(
    out: &mut W,
    pair: &str,
    outcome: &Result<DecisionResult, String>,
) -> io::Result<()> {
    match outcome {
        Ok(d) => writeln!(
            out,
            "{:<10} {:<12} score {:>3}  factors {}  price {:.4}",
            pair,
            d.category.code(),
            d.score,
            d.factor_count(),
            d.current_price
        ),
        Err(e) => writeln!(out, "{pair:<10} error: {e}"),
    }
}
