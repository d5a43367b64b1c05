//! Order book module for snapshot data.
//!
//! This module handles:
//! - Order book types and data structures
//! - Parsing raw feed records into typed levels
//! - Top-of-book, spread and depth aggregation
//! - Budget-based execution cost simulation

pub mod aggregator;
pub mod parser;
pub mod types;
pub mod walk;

pub use aggregator::{best_bid_ask, depth_in_band, midpoint, spread, top_levels};
pub use parser::{parse_levels, parse_snapshot, ParsedBook};
pub use types::{BookSide, BudgetFill, OrderBookSnapshot, PriceLevel};
pub use walk::{avg_fill_price, simulate_buy, slippage, slippage_baseline};
