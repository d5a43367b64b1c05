//! Snapshot, stream and analyze runs end to end.

use std::fs;

use polymarket_liquidity::market::PolymarketClient;
use polymarket_liquidity::pipeline::{run_analyze, run_snapshot, run_stream_once};
use polymarket_liquidity::storage::BronzeSnapshot;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use time::macros::datetime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_config;

fn gamma_markets() -> Value {
    json!([
        {
            "id": "m-small", "slug": "small", "active": true, "closed": false,
            "enableOrderBook": true, "volumeNum": 100, "clobTokenIds": "[\"t3\"]"
        },
        {
            "id": "m-big", "slug": "big", "active": true, "closed": false,
            "enableOrderBook": true, "volumeNum": "5000", "clobTokenIds": ["t1", "t2"]
        },
        {
            "id": "m-closed", "slug": "closed", "active": true, "closed": true,
            "enableOrderBook": true, "volumeNum": 99999, "clobTokenIds": ["t9"]
        }
    ])
}

fn books() -> Value {
    json!([
        {
            "asset_id": "t1", "timestamp": "1717000000000",
            "bids": [{"price": "0.48", "size": "100"}],
            "asks": [{"price": "0.50", "size": "500"}]
        },
        {
            "asset_id": "t2", "timestamp": "1717000000000",
            "bids": [{"price": "0.47", "size": "100"}],
            "asks": []
        },
        {
            "asset_id": "t3", "timestamp": "1717000000000",
            "bids": [], "asks": []
        }
    ])
}

async fn mock_apis(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gamma_markets()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices-history"))
        .and(query_param("market", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"history": []})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices-history"))
        .and(query_param("market", "t2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn snapshot_then_analyze() {
    let server = MockServer::start().await;
    mock_apis(&server).await;

    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), tmp.path());
    config.history_top_markets = 1;
    let client = PolymarketClient::new(&config).unwrap();

    let summary = run_snapshot(&client, &config, datetime!(2024-05-29 16:26:40 UTC))
        .await
        .unwrap();

    assert_eq!(summary.markets, 2);
    assert_eq!(summary.tokens, 3);
    assert_eq!(summary.books, 3);
    assert_eq!(summary.histories_saved, 1);
    assert_eq!(summary.histories_failed, 1);

    let snapshot = BronzeSnapshot::open(&summary.snapshot_dir);
    assert_eq!(snapshot.tag().unwrap(), "2024-05-29_162640");
    assert!(snapshot.price_history_path("t1").is_file());
    assert!(!snapshot.price_history_path("t2").exists());

    let markets: Value =
        serde_json::from_str(&fs::read_to_string(snapshot.markets_path()).unwrap()).unwrap();
    assert_eq!(markets[0]["slug"], json!("big"));
    assert_eq!(markets[0]["clobTokenIds"], json!(["t1", "t2"]));

    let analyzed = run_analyze(&config, None).unwrap();

    assert_eq!(analyzed.snapshot_dir, summary.snapshot_dir);
    assert_eq!(analyzed.report.records.len(), 3);
    assert_eq!(analyzed.report.malformed, 0);

    let gold = fs::read_to_string(&analyzed.gold_path).unwrap();
    let lines: Vec<&str> = gold.lines().collect();
    assert_eq!(
        lines[0],
        "snapshot_ts,token_id,best_bid,best_ask,mid,spread,depth_1pt,slippage_buy_10,slippage_buy_50,slippage_buy_200,score"
    );
    assert_eq!(lines.len(), 4);
    // t1: both levels inside the band, every budget fills at 0.50.
    // 600/1000 - 3*0.02 - 4*0.01 = 0.5
    assert_eq!(lines[1], "1717000000000,t1,0.48,0.5,0.49,0.02,600,0.01,0.01,0.01,0.5");
    // t2: bids only, no execution cost.
    assert_eq!(lines[2], "1717000000000,t2,0.47,,0.47,,100,,,,");
    assert_eq!(lines[3], "1717000000000,t3,,,,,,,,,");

    let silver = fs::read_to_string(&analyzed.silver_path).unwrap();
    assert!(analyzed
        .silver_path
        .ends_with("silver/orderbook_levels_2024-05-29_162640.csv"));
    assert_eq!(silver.lines().count(), 1 + 3);
}

#[tokio::test]
async fn analyze_explicit_snapshot_dir() {
    let tmp = TempDir::new().unwrap();
    let config = test_config("http://unused.invalid", tmp.path());
    let snapshot = BronzeSnapshot::create(tmp.path(), datetime!(2024-01-01 00:00:00 UTC)).unwrap();
    snapshot.write_order_books(&[json!("garbage")]).unwrap();

    let analyzed = run_analyze(&config, Some(snapshot.root())).unwrap();

    assert_eq!(analyzed.report.malformed, 1);
    assert!(analyzed.gold_path.ends_with("gold/metrics_2024-01-01_000000.csv"));
}

#[tokio::test]
async fn analyze_without_snapshots_fails() {
    let tmp = TempDir::new().unwrap();
    let config = test_config("http://unused.invalid", tmp.path());

    assert!(run_analyze(&config, None).is_err());
}

#[tokio::test]
async fn stream_once_reuses_token_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gamma_markets()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books()))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = test_config(&server.uri(), tmp.path());
    let client = PolymarketClient::new(&config).unwrap();
    let now = datetime!(2024-05-29 10:00:00 UTC);

    let first = run_stream_once(&client, &config, now).await.unwrap();
    let second = run_stream_once(&client, &config, now).await.unwrap();

    assert!(!first.token_cache_hit);
    assert!(second.token_cache_hit);
    assert_eq!(first.file, second.file);
    assert_eq!(second.tokens, 3);

    let content = fs::read_to_string(&first.file).unwrap();
    assert_eq!(content.lines().count(), 2);
}
