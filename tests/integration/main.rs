//! Integration tests for the Polymarket liquidity pipeline.
//!
//! HTTP is served by a local `wiremock` server and all files go to temporary
//! directories, so these run offline.

mod analytics;
mod client;
mod pipeline;

use std::path::Path;

use polymarket_liquidity::config::Config;

/// Config pointing both APIs at `base_url` and writing under `data_dir`.
pub fn test_config(base_url: &str, data_dir: &Path) -> Config {
    Config {
        polymarket_gamma_url: base_url.to_string(),
        polymarket_clob_url: base_url.to_string(),
        data_dir: data_dir.to_path_buf(),
        books_batch_pause_ms: 0,
        http_timeout_ms: 5_000,
        ..Config::default()
    }
}
