//! Swingscan CLI — momentum analysis commands over NSE stock universes.
//!
//! Commands:
//! - `universes` — list configured universes and their tickers
//! - `analyze` — score every symbol of one universe
//! - `rank` — rank all universes by average momentum score
//! - `top` — best symbols across all universes, deduplicated
//! - `top-universe` — best symbols within one universe

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use swingscan_core::analysis::{ScoreConfig, UniverseAnalyzer, UniverseRank};
use swingscan_core::data::{
    BackoffPolicy, ChunkFetcher, FyersProvider, HistoryCache, RateLimiter, RateLimits, UniverseSet,
};
use swingscan_core::domain::MomentumRecord;
use swingscan_core::Screener;

#[derive(Parser)]
#[command(
    name = "swingscan",
    about = "Swingscan CLI — momentum screening over stock universes"
)]
struct Cli {
    /// Fyers access token. Falls back to FYERS_ACCESS_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Fyers client id. Falls back to FYERS_CLIENT_ID.
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Universe definition file (TOML). Defaults to the built-in NSE set.
    #[arg(long, global = true)]
    universes: Option<PathBuf>,

    /// Calendar days of history to fetch per symbol.
    #[arg(long, global = true, default_value_t = 400)]
    days: i64,

    /// Worker pool width per universe analysis.
    #[arg(long, global = true, default_value_t = 10)]
    concurrency: usize,

    /// Scoring policy: strict (all lookbacks required) or degraded.
    #[arg(long, global = true, default_value = "strict")]
    policy: String,

    /// Emit JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured universes and their tickers.
    Universes,
    /// Fetch and score every symbol of one universe.
    Analyze {
        /// Universe name (e.g. Banking, IT).
        name: String,
    },
    /// Rank all universes by average momentum score.
    Rank,
    /// Best symbols across all universes, deduplicated by ticker.
    Top {
        /// Number of symbols to show.
        #[arg(long, default_value_t = 10)]
        n: usize,
    },
    /// Best symbols within one universe.
    TopUniverse {
        /// Universe name.
        name: String,

        /// Number of symbols to show.
        #[arg(long, default_value_t = 5)]
        k: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let set = match &cli.universes {
        Some(path) => UniverseSet::from_file(path)
            .with_context(|| format!("loading universes from {}", path.display()))?,
        None => UniverseSet::default_nse(),
    };

    // `universes` needs no credentials or network
    if matches!(cli.command, Commands::Universes) {
        return print_universes(&set, cli.json);
    }

    let screener = build_screener(&cli)?;

    match &cli.command {
        Commands::Universes => unreachable!("handled above"),
        Commands::Analyze { name } => {
            let symbols = set.tickers(name)?;
            let result = screener.analyze_universe(name, symbols);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Momentum analysis: {name}");
                print_records(&result.records);
                match result.average_momentum_score {
                    Some(avg) => println!("\nAverage momentum score: {avg:.4}"),
                    None => println!("\nAverage momentum score: n/a (no scored symbols)"),
                }
            }
        }
        Commands::Rank => {
            let ranks = screener.rank_universes(&set);
            print_ranks(&ranks, cli.json)?;
        }
        Commands::Top { n } => {
            let top = screener.top_symbols_across(&set, *n);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else {
                println!("Top {n} momentum symbols across all universes");
                print_records(&top);
            }
        }
        Commands::TopUniverse { name, k } => {
            let symbols = set.tickers(name)?;
            let top = screener.top_symbols_in(name, symbols, *k);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else {
                println!("Top {k} momentum symbols in {name}");
                print_records(&top);
            }
        }
    }

    Ok(())
}

fn build_screener(cli: &Cli) -> Result<Screener> {
    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("FYERS_ACCESS_TOKEN").ok());
    let Some(token) = token else {
        bail!("no access token: pass --token or set FYERS_ACCESS_TOKEN");
    };
    let client_id = cli
        .client_id
        .clone()
        .or_else(|| std::env::var("FYERS_CLIENT_ID").ok())
        .unwrap_or_default();

    let score_config = match cli.policy.as_str() {
        "strict" => ScoreConfig::strict(),
        "degraded" => ScoreConfig::degraded(),
        other => bail!("unknown scoring policy '{other}' (expected strict or degraded)"),
    };

    let provider = Arc::new(FyersProvider::new(client_id, token));
    let limiter = Arc::new(RateLimiter::new(RateLimits::default()));
    let fetcher = ChunkFetcher::new(provider, limiter)
        .with_cache(Arc::new(HistoryCache::new()))
        .with_backoff(BackoffPolicy::default());
    let analyzer =
        UniverseAnalyzer::with_concurrency(Arc::new(fetcher), score_config, cli.concurrency)
            .with_lookback_days(cli.days);

    Ok(Screener::new(analyzer))
}

fn print_universes(set: &UniverseSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(set)?);
        return Ok(());
    }
    for (name, tickers) in &set.universes {
        println!("{name} ({} tickers)", tickers.len());
        println!("  {}", tickers.join(", "));
    }
    Ok(())
}

fn print_ranks(ranks: &[UniverseRank], json: bool) -> Result<()> {
    if json {
        let rows: Vec<serde_json::Value> = ranks
            .iter()
            .map(|r| {
                serde_json::json!({
                    "universe": r.universe,
                    "average_score": r.average_score,
                    "scored": r.scored,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<4} {:<16} {:>14} {:>8}", "#", "Universe", "Avg Score", "Scored");
    for (i, rank) in ranks.iter().enumerate() {
        let avg = rank
            .average_score
            .map(|s| format!("{s:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<4} {:<16} {:>14} {:>8}",
            i + 1,
            rank.universe,
            avg,
            rank.scored
        );
    }
    Ok(())
}

fn print_records(records: &[MomentumRecord]) {
    if records.is_empty() {
        println!("No data available.");
        return;
    }

    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Ticker", "Score", "3M %", "1M %", "1W %", "Ann.Vol", "Close"
    );
    for r in records {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10.2}",
            r.ticker,
            fmt_opt(r.momentum_score, 4),
            fmt_opt(r.return_3m_pct, 2),
            fmt_opt(r.return_1m_pct, 2),
            fmt_opt(r.return_1w_pct, 2),
            fmt_opt(r.annualized_volatility, 4),
            r.last_close,
        );
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}
