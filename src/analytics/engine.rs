//! Per-book metrics orchestration and batch analysis.

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::record::{LevelExportRow, MetricsRecord, SlippageEstimate};
use crate::config::AnalyticsConfig;
use crate::metrics;
use crate::orderbook::aggregator::{best_bid_ask, depth_in_band, midpoint, spread, top_levels};
use crate::orderbook::parser::{extract_timestamp, extract_token_id, parse_snapshot};
use crate::orderbook::walk::{avg_fill_price, slippage, slippage_baseline};
use crate::orderbook::{BookSide, OrderBookSnapshot};

/// Metrics and level export for one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookAnalysis {
    /// Derived metrics.
    pub record: MetricsRecord,
    /// Top-N levels per side, bids first.
    pub levels: Vec<LevelExportRow>,
    /// Whether the raw record could not be turned into a snapshot.
    pub malformed: bool,
    /// Raw levels dropped by the parser.
    pub dropped_levels: usize,
}

/// Output of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One record per input, in input order.
    pub records: Vec<MetricsRecord>,
    /// Flattened level export for every well-formed book.
    pub levels: Vec<LevelExportRow>,
    /// Inputs that fell back to an all-absent record.
    pub malformed: usize,
    /// Books with a negative spread.
    pub crossed: usize,
    /// Raw levels dropped by the parser across the batch.
    pub dropped_levels: usize,
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scored = self.records.iter().filter(|r| r.score.is_some()).count();
        write!(
            f,
            "books={} scored={} malformed={} crossed={} dropped_levels={} level_rows={}",
            self.records.len(),
            scored,
            self.malformed,
            self.crossed,
            self.dropped_levels,
            self.levels.len(),
        )
    }
}

/// Compute the metrics record for one parsed snapshot.
pub fn compute_metrics(book: &OrderBookSnapshot, config: &AnalyticsConfig) -> MetricsRecord {
    let (best_bid, best_ask) = best_bid_ask(&book.bids, &book.asks);
    let mid = midpoint(best_bid, best_ask);
    let spread = spread(best_bid, best_ask);
    let depth = depth_in_band(&book.bids, &book.asks, mid, config.depth_band);
    let baseline = slippage_baseline(mid, best_ask);

    let estimates: Vec<SlippageEstimate> = config
        .budgets
        .iter()
        .map(|&budget| {
            let fill = avg_fill_price(&book.asks, budget);
            SlippageEstimate {
                budget,
                avg_fill_price: fill,
                slippage: slippage(fill, baseline),
            }
        })
        .collect();

    let slippage_ref = estimates
        .get(config.reference_budget_index)
        .and_then(|e| e.slippage);
    let score = config.score_weights.score(depth, spread, slippage_ref);

    MetricsRecord {
        snapshot_ts: book.timestamp.clone(),
        token_id: book.token_id.clone(),
        best_bid,
        best_ask,
        mid,
        spread,
        depth_in_band: depth,
        slippage: estimates,
        score,
    }
}

/// Top-N level rows per side, bids then asks, ranked from 1.
pub fn export_levels(book: &OrderBookSnapshot, top_n: usize) -> Vec<LevelExportRow> {
    [BookSide::Bid, BookSide::Ask]
        .into_iter()
        .flat_map(|side| {
            top_levels(book.side(side), side, top_n)
                .into_iter()
                .enumerate()
                .map(move |(i, level)| LevelExportRow {
                    snapshot_ts: book.timestamp.clone(),
                    token_id: book.token_id.clone(),
                    side,
                    rank: i + 1,
                    price: level.price,
                    size: level.size,
                })
        })
        .collect()
}

/// Analyze one raw order-book record.
///
/// Never fails: a record that cannot be parsed yields an all-absent metrics
/// record carrying whatever identity could be recovered.
pub fn analyze_record(raw: &Value, config: &AnalyticsConfig) -> BookAnalysis {
    match parse_snapshot(raw) {
        Ok(parsed) => {
            let book = parsed.snapshot;
            let record = compute_metrics(&book, config);

            if record.is_crossed() {
                warn!(
                    token_id = %book.token_id,
                    best_bid = ?record.best_bid,
                    best_ask = ?record.best_ask,
                    "Order book crossed"
                );
            }

            if parsed.dropped_levels > 0 {
                debug!(
                    token_id = %book.token_id,
                    dropped = parsed.dropped_levels,
                    "Dropped unparseable levels"
                );
            }

            BookAnalysis {
                levels: export_levels(&book, config.top_levels_per_side),
                record,
                malformed: false,
                dropped_levels: parsed.dropped_levels,
            }
        }
        Err(e) => {
            let token_id = extract_token_id(raw).unwrap_or_default();
            let snapshot_ts = extract_timestamp(raw);
            warn!(token_id = %token_id, error = %e, "Malformed order book record");

            BookAnalysis {
                record: MetricsRecord::absent(token_id, snapshot_ts, &config.budgets),
                levels: Vec::new(),
                malformed: true,
                dropped_levels: 0,
            }
        }
    }
}

/// Analyze every record of a snapshot in parallel.
///
/// Each book is independent; results come back in input order.
#[instrument(skip(raws, config), fields(books = raws.len()))]
pub fn analyze_batch(raws: &[Value], config: &AnalyticsConfig) -> BatchReport {
    let _timer = metrics::timer_batch_analysis();

    let analyses: Vec<BookAnalysis> = raws
        .par_iter()
        .map(|raw| analyze_record(raw, config))
        .collect();

    let mut report = BatchReport {
        records: Vec::with_capacity(analyses.len()),
        ..BatchReport::default()
    };

    for analysis in analyses {
        if analysis.malformed {
            report.malformed += 1;
        }
        if analysis.record.is_crossed() {
            report.crossed += 1;
        }
        report.dropped_levels += analysis.dropped_levels;
        report.levels.extend(analysis.levels);
        report.records.push(analysis.record);
    }

    metrics::record_batch(&report);
    info!(summary = %report, "Batch analysis complete");

    report
}
