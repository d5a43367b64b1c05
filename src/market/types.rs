//! Market-related types for Polymarket Gamma / CLOB data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Market entry from the Gamma `/markets` endpoint.
///
/// Only the fields used for selection are typed; numeric fields stay as raw JSON
/// because Gamma sends them as numbers or strings depending on the market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    /// Market ID.
    #[serde(default)]
    pub id: Option<Value>,
    /// Market slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Market question.
    #[serde(default)]
    pub question: Option<String>,
    /// Market category.
    #[serde(default)]
    pub category: Option<String>,
    /// Start date (ISO format).
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date (ISO format).
    #[serde(default)]
    pub end_date: Option<String>,
    /// Whether the market is active.
    #[serde(default)]
    pub active: Option<bool>,
    /// Whether the market is closed.
    #[serde(default)]
    pub closed: Option<bool>,
    /// Whether the market trades on the CLOB.
    #[serde(default)]
    pub enable_order_book: Option<bool>,
    /// Lifetime volume.
    #[serde(default)]
    pub volume_num: Option<Value>,
    /// Current liquidity.
    #[serde(default)]
    pub liquidity_num: Option<Value>,
    /// CLOB token IDs, either an array or a JSON-encoded array string.
    #[serde(default)]
    pub clob_token_ids: Option<Value>,
}

/// Market kept for snapshotting, as written to `markets_top.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedMarket {
    /// Market ID.
    pub market_id: Option<Value>,
    /// Market slug.
    pub slug: Option<String>,
    /// Market question.
    pub question: Option<String>,
    /// Market category.
    pub category: Option<String>,
    /// Start date (ISO format).
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// End date (ISO format).
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    /// Whether the market is active.
    pub active: Option<bool>,
    /// Whether the market is closed.
    pub closed: Option<bool>,
    /// Whether the market trades on the CLOB.
    #[serde(rename = "enableOrderBook")]
    pub enable_order_book: Option<bool>,
    /// Lifetime volume.
    #[serde(rename = "volumeNum")]
    pub volume_num: Option<Value>,
    /// Current liquidity.
    #[serde(rename = "liquidityNum")]
    pub liquidity_num: Option<Value>,
    /// CLOB token IDs.
    #[serde(rename = "clobTokenIds")]
    pub clob_token_ids: Vec<String>,
}
