//! Normalization of raw order-book records into typed levels.
//!
//! Upstream feeds send prices and sizes as strings, numbers, or occasionally
//! garbage. Every coercion here is total: anything that is not a finite number
//! becomes `None` and the owning level is dropped.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::types::{BookSide, OrderBookSnapshot, PriceLevel};
use crate::error::RecordError;

/// Magnitudes below the smallest representable decimal step.
const UNDERFLOW_BOUND: f64 = 1e-28;

/// Keys that may carry the token identity, in priority order.
const IDENTITY_KEYS: [&str; 2] = ["asset_id", "token_id"];

/// Parsed snapshot plus bookkeeping about what was discarded.
#[derive(Debug, Clone)]
pub struct ParsedBook {
    /// The typed snapshot.
    pub snapshot: OrderBookSnapshot,
    /// Raw level entries that failed coercion (both sides).
    pub dropped_levels: usize,
}

/// Coerce a JSON value into a finite decimal.
///
/// Accepts numbers and numeric strings (plain or scientific, surrounding
/// whitespace ignored). Values finer than 28 decimal places round, and anything
/// below that step reads as zero. Booleans, null, containers, `NaN`, infinities
/// and magnitudes beyond the decimal range are rejected.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s.trim()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .or_else(|| parse_decimal_f64(s))
}

fn parse_decimal_f64(s: &str) -> Option<Decimal> {
    let v = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if v.abs() < UNDERFLOW_BOUND {
        return Some(Decimal::ZERO);
    }
    Decimal::from_f64(v)
}

/// Parse one raw level. Both `price` and `size` must coerce.
pub fn parse_level(raw: &Value) -> Option<PriceLevel> {
    let price = coerce_decimal(raw.get("price")?)?;
    let size = coerce_decimal(raw.get("size")?)?;
    Some(PriceLevel { price, size })
}

/// Parse a sequence of raw levels, keeping input order and dropping failures.
pub fn parse_levels(raw: &[Value]) -> Vec<PriceLevel> {
    raw.iter().filter_map(parse_level).collect()
}

/// Raw entries of one side (`bids`/`asks`); anything other than an array reads as empty.
fn side_entries(record: &Value, side: BookSide) -> &[Value] {
    match record.get(format!("{side}s")) {
        Some(Value::Array(entries)) => entries,
        _ => &[],
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Token identity of a raw record, if any. Empty strings do not count.
pub fn extract_token_id(record: &Value) -> Option<String> {
    IDENTITY_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(scalar_to_string)
        .find(|id| !id.is_empty())
}

/// Snapshot timestamp of a raw record, empty when absent.
pub fn extract_timestamp(record: &Value) -> String {
    record
        .get("timestamp")
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

/// Build a typed snapshot from one raw order-book record.
pub fn parse_snapshot(record: &Value) -> Result<ParsedBook, RecordError> {
    if !record.is_object() {
        return Err(RecordError::NotAnObject);
    }

    let token_id = extract_token_id(record).ok_or(RecordError::MissingIdentity)?;
    let timestamp = extract_timestamp(record);

    let raw_bids = side_entries(record, BookSide::Bid);
    let raw_asks = side_entries(record, BookSide::Ask);
    let bids = parse_levels(raw_bids);
    let asks = parse_levels(raw_asks);
    let dropped_levels = (raw_bids.len() - bids.len()) + (raw_asks.len() - asks.len());

    Ok(ParsedBook {
        snapshot: OrderBookSnapshot {
            token_id,
            timestamp,
            bids,
            asks,
        },
        dropped_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn coerces_strings_and_numbers() {
        assert_eq!(coerce_decimal(&json!("0.52")), Some(dec!(0.52)));
        assert_eq!(coerce_decimal(&json!(" 12 ")), Some(dec!(12)));
        assert_eq!(coerce_decimal(&json!(0.1)), Some(dec!(0.1)));
        assert_eq!(coerce_decimal(&json!(250)), Some(dec!(250)));
        assert_eq!(coerce_decimal(&json!(-3)), Some(dec!(-3)));
        assert_eq!(coerce_decimal(&json!("1e-3")), Some(dec!(0.001)));
    }

    #[test]
    fn tiny_magnitudes_read_as_zero() {
        assert_eq!(coerce_decimal(&json!("1e-30")), Some(Decimal::ZERO));
        assert_eq!(coerce_decimal(&json!("-1e-30")), Some(Decimal::ZERO));
        assert_eq!(coerce_decimal(&json!(5e-324)), Some(Decimal::ZERO));
        assert_eq!(coerce_decimal(&json!(1e-30)), Some(Decimal::ZERO));
    }

    #[test]
    fn tiny_size_keeps_its_level() {
        let raw = vec![json!({"price": "0.5", "size": "1e-30"})];
        assert_eq!(parse_levels(&raw), vec![PriceLevel::new(dec!(0.5), Decimal::ZERO)]);
    }

    #[test]
    fn out_of_range_magnitudes_are_rejected() {
        assert_eq!(coerce_decimal(&json!("1e300")), None);
        assert_eq!(coerce_decimal(&json!(1e300)), None);
        assert_eq!(coerce_decimal(&json!("-1e40")), None);
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert_eq!(coerce_decimal(&json!("abc")), None);
        assert_eq!(coerce_decimal(&json!("")), None);
        assert_eq!(coerce_decimal(&json!("NaN")), None);
        assert_eq!(coerce_decimal(&json!("inf")), None);
        assert_eq!(coerce_decimal(&json!("-infinity")), None);
        assert_eq!(coerce_decimal(&json!(true)), None);
        assert_eq!(coerce_decimal(&Value::Null), None);
        assert_eq!(coerce_decimal(&json!([1])), None);
        assert_eq!(coerce_decimal(&json!({"v": 1})), None);
    }

    #[test]
    fn parse_levels_drops_bad_entries_and_keeps_order() {
        let raw = vec![
            json!({"price": "0.55", "size": "10"}),
            json!({"price": "oops", "size": "10"}),
            json!({"price": "0.40"}),
            json!({"price": null, "size": 5}),
            json!("not a level"),
            json!({"price": 0.45, "size": 20}),
        ];

        let levels = parse_levels(&raw);

        assert_eq!(
            levels,
            vec![
                PriceLevel::new(dec!(0.55), dec!(10)),
                PriceLevel::new(dec!(0.45), dec!(20)),
            ]
        );
    }

    #[test]
    fn parse_snapshot_prefers_asset_id() {
        let record = json!({
            "asset_id": "asset-1",
            "token_id": "token-1",
            "timestamp": "1700000000000",
            "bids": [{"price": "0.48", "size": "50"}],
            "asks": [{"price": "0.52", "size": "25"}, {"price": "x", "size": "1"}],
        });

        let parsed = parse_snapshot(&record).unwrap();

        assert_eq!(parsed.snapshot.token_id, "asset-1");
        assert_eq!(parsed.snapshot.timestamp, "1700000000000");
        assert_eq!(parsed.snapshot.bids.len(), 1);
        assert_eq!(parsed.snapshot.asks.len(), 1);
        assert_eq!(parsed.dropped_levels, 1);
    }

    #[test]
    fn parse_snapshot_falls_back_to_token_id() {
        let record = json!({"asset_id": "", "token_id": 42, "bids": [], "asks": []});
        let parsed = parse_snapshot(&record).unwrap();
        assert_eq!(parsed.snapshot.token_id, "42");
        assert_eq!(parsed.snapshot.timestamp, "");
    }

    #[test]
    fn non_array_sides_read_as_empty() {
        let record = json!({"asset_id": "a", "bids": "garbage", "asks": null});
        let parsed = parse_snapshot(&record).unwrap();
        assert!(parsed.snapshot.is_empty());
        assert_eq!(parsed.dropped_levels, 0);
    }

    #[test]
    fn parse_snapshot_rejects_malformed_records() {
        assert!(matches!(
            parse_snapshot(&json!([1, 2])),
            Err(RecordError::NotAnObject)
        ));
        assert!(matches!(
            parse_snapshot(&json!({"bids": []})),
            Err(RecordError::MissingIdentity)
        ));
    }
}
