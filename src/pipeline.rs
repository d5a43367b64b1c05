//! End-to-end runs: bronze snapshot, stream append, and silver/gold analysis.

use std::path::{Path, PathBuf};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::analytics::{analyze_batch, BatchReport};
use crate::config::Config;
use crate::error::Result;
use crate::market::{select_top_markets, unique_token_ids, PolymarketClient};
use crate::storage::{
    find_latest_snapshot, gold_path, silver_path, write_levels_csv, write_metrics_csv,
    BronzeSnapshot, StreamStore,
};

/// Pause between price history requests.
const HISTORY_PAUSE: Duration = Duration::from_millis(150);

/// What a snapshot run wrote.
#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub snapshot_dir: PathBuf,
    pub markets: usize,
    pub tokens: usize,
    pub books: usize,
    pub histories_saved: usize,
    pub histories_failed: usize,
}

/// What a stream-once run appended.
#[derive(Debug, Clone)]
pub struct StreamSummary {
    pub file: PathBuf,
    pub tokens: usize,
    pub books: usize,
    pub token_cache_hit: bool,
}

/// What an analyze run wrote.
#[derive(Debug)]
pub struct AnalyzeSummary {
    pub snapshot_dir: PathBuf,
    pub silver_path: PathBuf,
    pub gold_path: PathBuf,
    pub report: BatchReport,
}

/// Fetch markets, select the top ones, and write a full bronze snapshot.
///
/// Price history failures are logged per token and do not fail the run.
#[instrument(skip_all)]
pub async fn run_snapshot(
    client: &PolymarketClient,
    config: &Config,
    now: OffsetDateTime,
) -> Result<SnapshotSummary> {
    let snapshot = BronzeSnapshot::create(&config.data_dir, now)?;

    let raw = client.fetch_markets(config.markets_fetch_limit, 0).await?;
    let markets = select_top_markets(raw, config.top_markets);
    snapshot.write_markets(&markets)?;
    info!(markets = markets.len(), "Saved market selection");

    let token_ids = unique_token_ids(&markets);
    let books = client.fetch_order_books(&token_ids).await?;
    snapshot.write_order_books(&books)?;
    info!(tokens = token_ids.len(), books = books.len(), "Saved order books");

    let history_markets = &markets[..config.history_top_markets.min(markets.len())];
    let history_tokens = unique_token_ids(history_markets);

    let mut histories_saved = 0;
    let mut histories_failed = 0;
    for (i, token_id) in history_tokens.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(HISTORY_PAUSE).await;
        }

        let fetched = client
            .fetch_price_history(token_id, &config.history_interval, config.history_fidelity_min)
            .await;

        match fetched {
            Ok(history) => {
                snapshot.write_price_history(token_id, &history)?;
                histories_saved += 1;
            }
            Err(e) => {
                warn!(token_id = %token_id, error = %e, "Price history fetch failed");
                histories_failed += 1;
            }
        }
    }
    info!(saved = histories_saved, failed = histories_failed, "Saved price history");

    Ok(SnapshotSummary {
        snapshot_dir: snapshot.root().to_path_buf(),
        markets: markets.len(),
        tokens: token_ids.len(),
        books: books.len(),
        histories_saved,
        histories_failed,
    })
}

/// Append one books snapshot to today's stream file, reusing a fresh token cache.
#[instrument(skip_all)]
pub async fn run_stream_once(
    client: &PolymarketClient,
    config: &Config,
    now: OffsetDateTime,
) -> Result<StreamSummary> {
    let store = StreamStore::new(&config.data_dir);
    let max_age = Duration::from_secs(config.token_cache_max_age_hours.saturating_mul(3600));

    let (token_ids, token_cache_hit) = match store.cached_tokens(max_age) {
        Some(tokens) => (tokens, true),
        None => {
            let raw = client.fetch_markets(config.markets_fetch_limit, 0).await?;
            let markets = select_top_markets(raw, config.top_markets);
            let tokens = unique_token_ids(&markets);
            store.save_selection(&markets, &tokens)?;
            (tokens, false)
        }
    };

    let books = client.fetch_order_books(&token_ids).await?;
    let file = store.append_snapshot(now, token_ids.len(), &books)?;

    info!(
        file = %file.display(),
        tokens = token_ids.len(),
        books = books.len(),
        token_cache_hit,
        "Appended stream snapshot"
    );

    Ok(StreamSummary {
        file,
        tokens: token_ids.len(),
        books: books.len(),
        token_cache_hit,
    })
}

/// Analyze a bronze snapshot (the latest one unless `snapshot_dir` is given)
/// into the silver level table and the gold metrics table.
#[instrument(skip(config))]
pub fn run_analyze(config: &Config, snapshot_dir: Option<&Path>) -> Result<AnalyzeSummary> {
    let snapshot = match snapshot_dir {
        Some(dir) => BronzeSnapshot::open(dir),
        None => find_latest_snapshot(&config.data_dir)?,
    };
    let tag = snapshot.tag()?;
    info!(snapshot = %snapshot.root().display(), %tag, "Analyzing snapshot");

    let raws = snapshot.load_order_books()?;
    let analytics = config.analytics();
    let report = analyze_batch(&raws, &analytics);

    let silver = silver_path(&config.data_dir, &tag);
    let gold = gold_path(&config.data_dir, &tag);
    write_levels_csv(&silver, &report.levels)?;
    write_metrics_csv(&gold, &report.records, &analytics.budgets)?;

    Ok(AnalyzeSummary {
        snapshot_dir: snapshot.root().to_path_buf(),
        silver_path: silver,
        gold_path: gold,
        report,
    })
}
