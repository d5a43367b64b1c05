//! Polymarket Gamma and CLOB HTTP client.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::MarketError;
use crate::metrics::record_http_latency;

use super::types::GammaMarket;

const MARKETS_ENDPOINT: &str = "/markets";
const BOOKS_ENDPOINT: &str = "/books";
const PRICES_HISTORY_ENDPOINT: &str = "/prices-history";

/// Read-only client for market discovery and order book snapshots.
#[derive(Debug, Clone)]
pub struct PolymarketClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the Gamma markets API.
    gamma_url: String,
    /// Base URL for the CLOB API.
    clob_url: String,
    /// Token IDs per `POST /books` request.
    books_batch_size: usize,
    /// Pause between book batches.
    books_batch_pause: Duration,
}

impl PolymarketClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(Duration::from_secs(5))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            gamma_url: config.polymarket_gamma_url.trim_end_matches('/').to_string(),
            clob_url: config.polymarket_clob_url.trim_end_matches('/').to_string(),
            books_batch_size: config.books_batch_size.max(1),
            books_batch_pause: config.books_batch_pause(),
        })
    }

    /// Fetch one page of markets, highest volume first, excluding closed ones.
    #[instrument(skip(self))]
    pub async fn fetch_markets(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<GammaMarket>, MarketError> {
        let url = format!("{}{}", self.gamma_url, MARKETS_ENDPOINT);
        let start = Instant::now();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("order", "volumeNum".to_string()),
                ("ascending", "false".to_string()),
                ("closed", "false".to_string()),
            ])
            .send()
            .await?;

        let body = read_json(response, MARKETS_ENDPOINT).await;
        record_http_latency(start, MARKETS_ENDPOINT);

        let Value::Array(items) = body? else {
            return Err(MarketError::UnexpectedResponse {
                endpoint: MARKETS_ENDPOINT.to_string(),
                reason: "expected a JSON array of markets".to_string(),
            });
        };

        let total = items.len();
        let markets: Vec<GammaMarket> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(market) => Some(market),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable market entry");
                    None
                }
            })
            .collect();

        debug!(total, decoded = markets.len(), "Fetched markets");
        Ok(markets)
    }

    /// Fetch raw order books for the given tokens, in batches with a pause between them.
    #[instrument(skip(self, token_ids), fields(tokens = token_ids.len()))]
    pub async fn fetch_order_books(&self, token_ids: &[String]) -> Result<Vec<Value>, MarketError> {
        let url = format!("{}{}", self.clob_url, BOOKS_ENDPOINT);
        let mut books = Vec::with_capacity(token_ids.len());

        for (i, chunk) in token_ids.chunks(self.books_batch_size).enumerate() {
            if i > 0 && !self.books_batch_pause.is_zero() {
                tokio::time::sleep(self.books_batch_pause).await;
            }

            let payload: Vec<Value> = chunk.iter().map(|t| json!({ "token_id": t })).collect();
            let start = Instant::now();

            let response = self.http.post(&url).json(&payload).send().await?;
            let body = read_json(response, BOOKS_ENDPOINT).await;
            record_http_latency(start, BOOKS_ENDPOINT);

            match body? {
                Value::Array(items) => books.extend(items),
                obj @ Value::Object(_) => books.push(obj),
                other => {
                    return Err(MarketError::UnexpectedResponse {
                        endpoint: BOOKS_ENDPOINT.to_string(),
                        reason: format!("expected array or object, got {}", json_kind(&other)),
                    });
                }
            }

            debug!(batch = i, requested = chunk.len(), collected = books.len(), "Fetched book batch");
        }

        Ok(books)
    }

    /// Fetch the price history of one token.
    #[instrument(skip(self))]
    pub async fn fetch_price_history(
        &self,
        token_id: &str,
        interval: &str,
        fidelity_min: u32,
    ) -> Result<Value, MarketError> {
        let url = format!("{}{}", self.clob_url, PRICES_HISTORY_ENDPOINT);
        let start = Instant::now();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("market", token_id.to_string()),
                ("interval", interval.to_string()),
                ("fidelity", fidelity_min.to_string()),
            ])
            .send()
            .await?;

        let body = read_json(response, PRICES_HISTORY_ENDPOINT).await;
        record_http_latency(start, PRICES_HISTORY_ENDPOINT);
        body
    }
}

/// Check the status and decode the body as JSON.
async fn read_json(response: reqwest::Response, endpoint: &str) -> Result<Value, MarketError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MarketError::FetchFailed {
            endpoint: endpoint.to_string(),
            reason: format!("HTTP {} - {}", status, body),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| MarketError::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("invalid JSON body: {}", e),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
