//! Polymarket client against a local mock server.

use polymarket_liquidity::error::MarketError;
use polymarket_liquidity::market::PolymarketClient;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::test_config;

async fn client_for(server: &MockServer, batch_size: usize) -> (PolymarketClient, TempDir) {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), tmp.path());
    config.books_batch_size = batch_size;
    (PolymarketClient::new(&config).unwrap(), tmp)
}

#[tokio::test]
async fn fetch_markets_sends_ranking_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("limit", "300"))
        .and(query_param("offset", "0"))
        .and(query_param("order", "volumeNum"))
        .and(query_param("ascending", "false"))
        .and(query_param("closed", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "slug": "a", "enableOrderBook": true, "volumeNum": 10},
            {"id": "2", "slug": "b", "clobTokenIds": "[\"x\"]"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 50).await;
    let markets = client.fetch_markets(300, 0).await.unwrap();

    let slugs: Vec<_> = markets.iter().filter_map(|m| m.slug.clone()).collect();
    assert_eq!(slugs, vec!["a", "b"]);
}

#[tokio::test]
async fn fetch_markets_rejects_non_array_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 50).await;
    let err = client.fetch_markets(10, 0).await.unwrap_err();

    assert!(matches!(err, MarketError::UnexpectedResponse { .. }));
}

#[tokio::test]
async fn fetch_markets_maps_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 50).await;
    let err = client.fetch_markets(10, 0).await.unwrap_err();

    match err {
        MarketError::FetchFailed { endpoint, reason } => {
            assert_eq!(endpoint, "/markets");
            assert!(reason.contains("503"));
            assert!(reason.contains("maintenance"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_order_books_batches_and_merges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .and(body_json(json!([{"token_id": "a"}, {"token_id": "b"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"asset_id": "a", "bids": [], "asks": []},
            {"asset_id": "b", "bids": [], "asks": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .and(body_json(json!([{"token_id": "c"}])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"asset_id": "c", "bids": [], "asks": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 2).await;
    let tokens = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let books = client.fetch_order_books(&tokens).await.unwrap();

    let ids: Vec<_> = books.iter().map(|b| b["asset_id"].clone()).collect();
    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test]
async fn fetch_order_books_with_no_tokens_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 50).await;

    assert!(client.fetch_order_books(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_price_history_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices-history"))
        .and(query_param("market", "tok"))
        .and(query_param("interval", "1w"))
        .and(query_param("fidelity", "15"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"history": [{"t": 1, "p": 0.5}]})),
        )
        .mount(&server)
        .await;

    let (client, _tmp) = client_for(&server, 50).await;
    let history = client.fetch_price_history("tok", "1w", 15).await.unwrap();

    assert_eq!(history["history"][0]["p"], json!(0.5));
}
