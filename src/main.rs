//! Polymarket liquidity snapshot and analytics entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polymarket_liquidity::config::Config;
use polymarket_liquidity::market::PolymarketClient;
use polymarket_liquidity::metrics;
use polymarket_liquidity::pipeline::{run_analyze, run_snapshot, run_stream_once};

/// Polymarket order book liquidity analytics.
#[derive(Parser, Debug)]
#[command(name = "polymarket-liquidity")]
#[command(about = "Snapshot Polymarket order books and score their liquidity")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch top markets, their books and price history into a bronze snapshot.
    Snapshot,

    /// Append one books snapshot to the daily stream file.
    StreamOnce,

    /// Turn a bronze snapshot into silver levels and gold metrics.
    Analyze {
        /// Snapshot directory to analyze (defaults to the latest one).
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("polymarket_liquidity=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    metrics::init_metrics();

    match args.command {
        Command::Snapshot => cmd_snapshot().await,
        Command::StreamOnce => cmd_stream_once().await,
        Command::Analyze { snapshot_dir } => cmd_analyze(snapshot_dir),
        Command::CheckConfig => cmd_check_config(),
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    config.validate()?;
    Ok(config)
}

async fn cmd_snapshot() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = PolymarketClient::new(&config)?;

    let summary = run_snapshot(&client, &config, OffsetDateTime::now_utc()).await?;

    info!(
        dir = %summary.snapshot_dir.display(),
        markets = summary.markets,
        tokens = summary.tokens,
        books = summary.books,
        histories = summary.histories_saved,
        history_failures = summary.histories_failed,
        "Snapshot complete"
    );
    Ok(())
}

async fn cmd_stream_once() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = PolymarketClient::new(&config)?;

    let summary = run_stream_once(&client, &config, OffsetDateTime::now_utc()).await?;

    info!(
        file = %summary.file.display(),
        tokens = summary.tokens,
        books = summary.books,
        "Stream snapshot saved"
    );
    Ok(())
}

fn cmd_analyze(snapshot_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config()?;

    let summary = run_analyze(&config, snapshot_dir.as_deref())?;

    info!(
        snapshot = %summary.snapshot_dir.display(),
        silver = %summary.silver_path.display(),
        gold = %summary.gold_path.display(),
        "{}",
        summary.report
    );
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("POLYMARKET LIQUIDITY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    let analytics = config.analytics();
    let budgets: Vec<String> = analytics.budgets.iter().map(|b| b.to_string()).collect();

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Gamma URL: {}", config.polymarket_gamma_url);
    println!("  CLOB URL: {}", config.polymarket_clob_url);
    println!("  Data Dir: {}", config.data_dir.display());
    println!("  Top Markets: {} (fetch limit {})", config.top_markets, config.markets_fetch_limit);
    println!("  Book Batches: {} tokens, {}ms pause", config.books_batch_size, config.books_batch_pause_ms);
    println!(
        "  Price History: top {} markets, interval {}, fidelity {}m",
        config.history_top_markets, config.history_interval, config.history_fidelity_min
    );
    println!("  Token Cache Max Age: {}h", config.token_cache_max_age_hours);
    println!("  Depth Band: +/-{}", analytics.depth_band);
    println!("  Budgets: {}", budgets.join(", "));
    println!(
        "  Reference Budget: {}",
        analytics
            .reference_budget()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Score Weights: depth/{} spread*{} slippage*{}",
        analytics.score_weights.depth_divisor,
        analytics.score_weights.spread_penalty,
        analytics.score_weights.slippage_penalty
    );
    println!("  Top Levels Per Side: {}", analytics.top_levels_per_side);
    println!("  Log Level: {}", config.rust_log);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
