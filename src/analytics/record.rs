//! Output records of the liquidity analytics.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::orderbook::{aggregator, BookSide};

/// Execution cost for one budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlippageEstimate {
    /// Cash budget simulated.
    pub budget: Decimal,
    /// Average price paid walking the asks.
    pub avg_fill_price: Option<Decimal>,
    /// Average price minus baseline (midpoint, else best ask).
    pub slippage: Option<Decimal>,
}

/// Per-token liquidity metrics for one snapshot.
///
/// `None` means "not computable from this book" and is never replaced by zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsRecord {
    /// Snapshot timestamp as reported by the feed.
    pub snapshot_ts: String,
    /// CLOB token ID.
    pub token_id: String,
    /// Highest bid.
    pub best_bid: Option<Decimal>,
    /// Lowest ask.
    pub best_ask: Option<Decimal>,
    /// Midpoint, or the only available side.
    pub mid: Option<Decimal>,
    /// Best ask minus best bid.
    pub spread: Option<Decimal>,
    /// Resting size within the depth band, both sides.
    pub depth_in_band: Option<Decimal>,
    /// One entry per configured budget, in configuration order.
    pub slippage: Vec<SlippageEstimate>,
    /// Composite ranking score, higher is better.
    pub score: Option<Decimal>,
}

impl MetricsRecord {
    /// Record with every derived field absent, one slot per budget.
    pub fn absent(token_id: String, snapshot_ts: String, budgets: &[Decimal]) -> Self {
        Self {
            snapshot_ts,
            token_id,
            best_bid: None,
            best_ask: None,
            mid: None,
            spread: None,
            depth_in_band: None,
            slippage: budgets
                .iter()
                .map(|&budget| SlippageEstimate {
                    budget,
                    avg_fill_price: None,
                    slippage: None,
                })
                .collect(),
            score: None,
        }
    }

    /// Slippage for a specific budget.
    pub fn slippage_for(&self, budget: Decimal) -> Option<Decimal> {
        self.slippage
            .iter()
            .find(|s| s.budget == budget)
            .and_then(|s| s.slippage)
    }

    /// Check if the book is crossed (negative spread).
    pub fn is_crossed(&self) -> bool {
        aggregator::is_crossed(self.best_bid, self.best_ask)
    }

    /// Check if every derived metric is absent.
    pub fn is_empty(&self) -> bool {
        self.best_bid.is_none() && self.best_ask.is_none()
    }
}

/// One of the top-N levels of a side, for the silver export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelExportRow {
    /// Snapshot timestamp.
    pub snapshot_ts: String,
    /// CLOB token ID.
    pub token_id: String,
    /// Book side.
    pub side: BookSide,
    /// 1 is the best price on the side.
    #[serde(rename = "level")]
    pub rank: usize,
    /// Level price.
    pub price: Decimal,
    /// Level size.
    pub size: Decimal,
}
