//! Market module for Polymarket discovery and snapshot fetching.
//!
//! This module handles:
//! - Gamma market types and the persisted selection
//! - Market filtering and volume ranking
//! - Polymarket Gamma / CLOB HTTP client

pub mod client;
pub mod discovery;
pub mod types;

pub use client::PolymarketClient;
pub use discovery::{parse_token_ids, select_top_markets, unique_token_ids};
pub use types::{GammaMarket, SelectedMarket};
