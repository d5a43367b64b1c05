//! Batch analytics over raw CLOB `/books` payloads.

use polymarket_liquidity::analytics::analyze_batch;
use polymarket_liquidity::config::AnalyticsConfig;
use polymarket_liquidity::orderbook::BookSide;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn close_to(value: Option<Decimal>, expected: Decimal) -> bool {
    value.is_some_and(|v| (v - expected).abs() < dec!(0.000001))
}

/// Book as the CLOB returns it: bids ascending, asks descending, strings everywhere.
fn clob_book() -> Value {
    json!({
        "market": "0xabc",
        "asset_id": "71321045679252212594626385532706912750332728571942532289631379312455583992563",
        "timestamp": "1717000000000",
        "hash": "0xdeadbeef",
        "bids": [
            {"price": "0.01", "size": "1000"},
            {"price": "0.45", "size": "100"},
            {"price": "0.49", "size": "30"}
        ],
        "asks": [
            {"price": "0.99", "size": "1000"},
            {"price": "0.55", "size": "200"},
            {"price": "0.51", "size": "20"}
        ],
        "min_order_size": "5",
        "tick_size": "0.01"
    })
}

#[test]
fn clob_payload_end_to_end() {
    let report = analyze_batch(&[clob_book()], &AnalyticsConfig::default());

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.malformed, 0);
    assert_eq!(report.crossed, 0);

    let record = &report.records[0];
    assert_eq!(record.snapshot_ts, "1717000000000");
    assert_eq!(record.best_bid, Some(dec!(0.49)));
    assert_eq!(record.best_ask, Some(dec!(0.51)));
    assert_eq!(record.mid, Some(dec!(0.50)));
    assert_eq!(record.spread, Some(dec!(0.02)));
    assert_eq!(record.depth_in_band, Some(dec!(50)));

    assert!(close_to(record.slippage_for(dec!(10)), dec!(0.01)));
    assert!(close_to(record.slippage_for(dec!(50)), dec!(0.0413385826771653)));
    assert!(close_to(record.slippage_for(dec!(200)), dec!(0.1653225806451612)));

    // 50/1000 - 3*0.02 - 4*slippage_50
    assert!(close_to(record.score, dec!(-0.1753543307086614)));
}

#[test]
fn level_export_is_sorted_and_capped() {
    let config = AnalyticsConfig {
        top_levels_per_side: 2,
        ..AnalyticsConfig::default()
    };

    let report = analyze_batch(&[clob_book()], &config);

    let bids: Vec<(usize, Decimal)> = report
        .levels
        .iter()
        .filter(|r| r.side == BookSide::Bid)
        .map(|r| (r.rank, r.price))
        .collect();
    let asks: Vec<(usize, Decimal)> = report
        .levels
        .iter()
        .filter(|r| r.side == BookSide::Ask)
        .map(|r| (r.rank, r.price))
        .collect();

    assert_eq!(bids, vec![(1, dec!(0.49)), (2, dec!(0.45))]);
    assert_eq!(asks, vec![(1, dec!(0.51)), (2, dec!(0.55))]);
}

#[test]
fn mixed_batch_keeps_input_order_and_counts() {
    let crossed = json!({
        "token_id": "crossed",
        "bids": [{"price": 0.60, "size": 10}],
        "asks": [{"price": 0.55, "size": 10}]
    });
    let garbage_levels = json!({
        "asset_id": "junk",
        "bids": [{"price": "abc", "size": "1"}, {"price": "0.40"}, "nope"],
        "asks": "not a list"
    });

    let raws = vec![
        clob_book(),
        json!("not an object"),
        crossed,
        json!({"bids": [], "asks": []}),
        garbage_levels,
    ];

    let report = analyze_batch(&raws, &AnalyticsConfig::default());

    assert_eq!(report.records.len(), raws.len());
    assert_eq!(report.malformed, 2);
    assert_eq!(report.crossed, 1);
    assert_eq!(report.dropped_levels, 3);

    assert_eq!(report.records[2].token_id, "crossed");
    assert_eq!(report.records[2].spread, Some(dec!(-0.05)));
    assert!(report.records[4].is_empty());
    assert_eq!(report.records[4].score, None);
}
