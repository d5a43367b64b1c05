//! Market selection: which Gamma markets get their books snapshotted.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use super::types::{GammaMarket, SelectedMarket};
use crate::orderbook::parser::coerce_decimal;

/// Token IDs from a `clobTokenIds` field.
///
/// Gamma sends either a JSON array or a string holding a JSON array. Any other
/// shape, or a string that does not decode to an array, yields no tokens.
pub fn parse_token_ids(raw: &Value) -> Vec<String> {
    let decoded;
    let value = match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => {
                decoded = v;
                &decoded
            }
            Err(_) => return Vec::new(),
        },
        other => other,
    };

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Volume used for ranking; anything unparseable ranks as zero.
fn volume_key(volume: Option<&Value>) -> Decimal {
    volume.and_then(coerce_decimal).unwrap_or(Decimal::ZERO)
}

/// Filter CLOB-tradeable, open, active markets and keep the `top_n` by volume.
pub fn select_top_markets(raw: Vec<GammaMarket>, top_n: usize) -> Vec<SelectedMarket> {
    let total = raw.len();

    let mut selected: Vec<SelectedMarket> = raw
        .into_iter()
        .filter(|m| m.enable_order_book == Some(true))
        .filter(|m| m.closed != Some(true))
        .filter(|m| m.active == Some(true))
        .filter_map(|m| {
            let clob_token_ids = m
                .clob_token_ids
                .as_ref()
                .map(parse_token_ids)
                .unwrap_or_default();

            if clob_token_ids.is_empty() {
                return None;
            }

            Some(SelectedMarket {
                market_id: m.id,
                slug: m.slug,
                question: m.question,
                category: m.category,
                start_date: m.start_date,
                end_date: m.end_date,
                active: m.active,
                closed: m.closed,
                enable_order_book: m.enable_order_book,
                volume_num: m.volume_num,
                liquidity_num: m.liquidity_num,
                clob_token_ids,
            })
        })
        .collect();

    // Stable: equal volumes keep Gamma's order.
    selected.sort_by(|a, b| {
        volume_key(b.volume_num.as_ref()).cmp(&volume_key(a.volume_num.as_ref()))
    });
    selected.truncate(top_n);

    debug!(total, selected = selected.len(), "Selected markets");

    selected
}

/// Sorted, de-duplicated token IDs across markets.
pub fn unique_token_ids(markets: &[SelectedMarket]) -> Vec<String> {
    markets
        .iter()
        .flat_map(|m| m.clob_token_ids.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
