//! Order book types and data structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Single price level in an order book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price at this level (quote currency per share).
    pub price: Decimal,
    /// Resting size at this level (shares).
    pub size: Decimal,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Notional value of the whole level, `None` on overflow.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.size)
    }
}

/// Side of the book a level rests on.
///
/// Displays as `bid`/`ask`; raw records keep each side under the plural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookSide {
    /// Resting buy interest.
    Bid,
    /// Resting sell interest.
    Ask,
}

/// Parsed two-sided book for one token at one instant.
///
/// Levels keep the order they arrived in; nothing here assumes the feed sorted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    /// CLOB token (asset) ID.
    pub token_id: String,
    /// Snapshot timestamp as reported by the feed.
    pub timestamp: String,
    /// Bid levels in input order.
    pub bids: Vec<PriceLevel>,
    /// Ask levels in input order.
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    /// Levels on the given side.
    pub fn side(&self, side: BookSide) -> &[PriceLevel] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// Check if both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Result of walking the ask side with a cash budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetFill {
    /// Cash budget the walk started with.
    pub budget: Decimal,
    /// Shares acquired, including a trailing partial level.
    pub filled_shares: Decimal,
    /// Cash actually spent.
    pub total_spent: Decimal,
    /// Volume-weighted average price paid.
    pub avg_price: Decimal,
    /// Highest price touched during the walk.
    pub worst_price: Decimal,
    /// Number of levels consumed wholly or partially.
    pub levels_touched: usize,
}

impl BudgetFill {
    /// Budget left unspent because the book ran out.
    pub fn unspent(&self) -> Decimal {
        (self.budget - self.total_spent).max(Decimal::ZERO)
    }
}
