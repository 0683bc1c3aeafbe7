//! TradeSignal CLI: score crypto pairs from their recent candles.
//!
//! Commands:
//! - `analyze`: fetch one pair, run the engine, print the signal and setup
//! - `scan`: analyze every configured pair in parallel, one line each
//! - `pairs`: list the configured pairs

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tradesignal_core::{analyze, Analysis};
use tradesignal_feed::{
    BinanceProvider, CachedProvider, CandleProvider, CircuitBreaker, CsvProvider, FeedConfig,
    Timeframe,
};

#[derive(Parser)]
#[command(
    name = "tradesignal",
    version,
    about = "TradeSignal CLI: rule-based crypto signal scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command that fetches candles.
#[derive(clap::Args)]
struct FeedArgs {
    /// Path to a TOML feed config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candle interval (1m 5m 15m 30m 1h 2h 4h 6h 12h 1d 1w). Overrides the config.
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Number of candles to fetch (1..=1000). Overrides the config.
    #[arg(long)]
    limit: Option<usize>,

    /// Read candles from a CSV file (or a directory of `SYMBOL[_tf].csv` files)
    /// instead of Binance.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one pair and print its signal, setup and reasons.
    Analyze {
        /// Pair as BASE/QUOTE, e.g. BTC/USDT.
        #[arg(long)]
        pair: String,

        #[command(flatten)]
        feed: FeedArgs,

        /// Also print the last N annotated candles.
        #[arg(long, default_value_t = 0)]
        tail: usize,
    },
    /// Analyze every configured pair in parallel.
    Scan {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// List the configured pairs.
    Pairs {
        /// Path to a TOML feed config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradesignal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { pair, feed, tail } => run_analyze(&pair, &feed, tail),
        Commands::Scan { feed } => run_scan(&feed),
        Commands::Pairs { config } => run_pairs(config.as_deref()),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &FeedArgs) -> Result<FeedConfig> {
    let mut config = FeedConfig::load_or_default(args.config.as_deref())
        .context("failed to load feed config")?;
    if let Some(tf) = args.timeframe {
        config.timeframe = tf;
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    config.validate().context("invalid feed settings")?;
    Ok(config)
}

fn build_provider(
    config: &FeedConfig,
    csv: Option<&Path>,
) -> Result<CachedProvider<Box<dyn CandleProvider>>> {
    let inner: Box<dyn CandleProvider> = match csv {
        Some(path) => Box::new(CsvProvider::open(path)),
        None => {
            let breaker = Arc::new(CircuitBreaker::default());
            let binance = BinanceProvider::new(config, breaker)
                .context("failed to set up Binance client")?;
            Box::new(binance)
        }
    };
    tracing::debug!(provider = inner.name(), ttl_secs = config.cache_ttl_secs, "provider ready");
    Ok(CachedProvider::new(inner, config.cache_ttl()))
}

fn fetch_and_analyze(
    provider: &dyn CandleProvider,
    config: &FeedConfig,
    pair: &str,
) -> Result<Analysis> {
    let candles = provider
        .fetch(pair, config.timeframe, config.limit)
        .with_context(|| format!("failed to fetch candles for {pair}"))?;
    tracing::info!(pair, candles = candles.len(), timeframe = %config.timeframe, "candles loaded");
    analyze(pair, &candles).with_context(|| format!("analysis failed for {pair}"))
}

fn run_analyze(pair: &str, args: &FeedArgs, tail: usize) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = build_provider(&config, args.csv.as_deref())?;
    let analysis = fetch_and_analyze(&provider, &config, pair)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        report::write_analysis(&mut io::stdout().lock(), &analysis, config.timeframe, tail)
            .context("failed to write report")?;
    }
    Ok(())
}

fn run_scan(args: &FeedArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = build_provider(&config, args.csv.as_deref())?;

    // par_iter + collect keeps the configured pair order
    let outcomes: Vec<(String, Result<Analysis, String>)> = config
        .pairs
        .par_iter()
        .map(|pair| {
            let outcome = fetch_and_analyze(&provider, &config, pair).map_err(|e| format!("{e:#}"));
            (pair.clone(), outcome)
        })
        .collect();

    let failures = outcomes.iter().filter(|(_, o)| o.is_err()).count();
    for (pair, outcome) in &outcomes {
        if let Err(e) = outcome {
            tracing::warn!(pair = %pair, error = %e, "pair failed");
        }
    }

    if args.json {
        let rows: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|(pair, outcome)| match outcome {
                Ok(a) => serde_json::json!({ "pair": pair, "decision": a.decision }),
                Err(e) => serde_json::json!({ "pair": pair, "error": e }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let mut out = io::stdout().lock();
        writeln!(out, "Scan · {} · {} pairs", config.timeframe, outcomes.len())?;
        for (pair, outcome) in &outcomes {
            let line = outcome.as_ref().map(|a| a.decision.clone()).map_err(Clone::clone);
            report::write_scan_line(&mut out, pair, &line)?;
        }
        if failures > 0 {
            writeln!(out, "\n{failures} of {} pairs failed", outcomes.len())?;
        }
    }

    if failures == outcomes.len() {
        bail!("every pair failed");
    }
    Ok(())
}

fn run_pairs(config: Option<&Path>) -> Result<()> {
    let config = FeedConfig::load_or_default(config).context("failed to load feed config")?;
    for pair in &config.pairs {
        println!("{pair}");
    }
    Ok(())
}
