//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::analytics::ScoreWeights;
use crate::error::ConfigError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream APIs ===
    /// Gamma markets API base URL.
    #[serde(default = "default_gamma_url")]
    pub polymarket_gamma_url: String,

    /// CLOB API base URL.
    #[serde(default = "default_clob_url")]
    pub polymarket_clob_url: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Snapshot Collection ===
    /// Root directory for bronze / silver / gold data.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Markets kept after filtering and volume ranking.
    #[serde(default = "default_top_markets")]
    pub top_markets: usize,

    /// Page size for the Gamma markets request.
    #[serde(default = "default_markets_fetch_limit")]
    pub markets_fetch_limit: usize,

    /// Token IDs per `POST /books` request.
    #[serde(default = "default_books_batch_size")]
    pub books_batch_size: usize,

    /// Pause between book batches in milliseconds.
    #[serde(default = "default_books_batch_pause_ms")]
    pub books_batch_pause_ms: u64,

    /// Markets whose tokens get price history downloaded.
    #[serde(default = "default_history_top_markets")]
    pub history_top_markets: usize,

    /// Price history interval (e.g. "1w").
    #[serde(default = "default_history_interval")]
    pub history_interval: String,

    /// Price history fidelity in minutes.
    #[serde(default = "default_history_fidelity_min")]
    pub history_fidelity_min: u32,

    /// Maximum age of the cached stream-mode token list.
    #[serde(default = "default_token_cache_max_age_hours")]
    pub token_cache_max_age_hours: u64,

    // === Analytics ===
    /// Levels per side written to the silver export.
    #[serde(default = "default_top_levels_per_side")]
    pub top_levels_per_side: usize,

    /// Half-width of the depth band around the midpoint.
    #[serde(default = "default_depth_band")]
    pub depth_band: Decimal,

    /// Cash budgets for the execution cost simulation.
    #[serde(default = "default_budgets")]
    pub budgets: Vec<Decimal>,

    /// Index into `budgets` used for scoring (defaults to the middle budget).
    #[serde(default)]
    pub reference_budget_index: Option<usize>,

    /// Depth is divided by this in the composite score.
    #[serde(default = "default_score_depth_divisor")]
    pub score_depth_divisor: Decimal,

    /// Spread multiplier in the composite score.
    #[serde(default = "default_score_spread_penalty")]
    pub score_spread_penalty: Decimal,

    /// Reference slippage multiplier in the composite score.
    #[serde(default = "default_score_slippage_penalty")]
    pub score_slippage_penalty: Decimal,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_top_markets() -> usize {
    100
}

fn default_markets_fetch_limit() -> usize {
    300
}

fn default_books_batch_size() -> usize {
    50
}

fn default_books_batch_pause_ms() -> u64 {
    200
}

fn default_history_top_markets() -> usize {
    20
}

fn default_history_interval() -> String {
    "1w".to_string()
}

fn default_history_fidelity_min() -> u32 {
    15
}

fn default_token_cache_max_age_hours() -> u64 {
    24
}

fn default_top_levels_per_side() -> usize {
    20
}

fn default_depth_band() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_budgets() -> Vec<Decimal> {
    vec![Decimal::new(10, 0), Decimal::new(50, 0), Decimal::new(200, 0)]
}

fn default_score_depth_divisor() -> Decimal {
    ScoreWeights::default().depth_divisor
}

fn default_score_spread_penalty() -> Decimal {
    ScoreWeights::default().spread_penalty
}

fn default_score_slippage_penalty() -> Decimal {
    ScoreWeights::default().slippage_penalty
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            polymarket_gamma_url: default_gamma_url(),
            polymarket_clob_url: default_clob_url(),
            http_timeout_ms: default_http_timeout_ms(),
            data_dir: default_data_dir(),
            top_markets: default_top_markets(),
            markets_fetch_limit: default_markets_fetch_limit(),
            books_batch_size: default_books_batch_size(),
            books_batch_pause_ms: default_books_batch_pause_ms(),
            history_top_markets: default_history_top_markets(),
            history_interval: default_history_interval(),
            history_fidelity_min: default_history_fidelity_min(),
            token_cache_max_age_hours: default_token_cache_max_age_hours(),
            top_levels_per_side: default_top_levels_per_side(),
            depth_band: default_depth_band(),
            budgets: default_budgets(),
            reference_budget_index: None,
            score_depth_divisor: default_score_depth_divisor(),
            score_spread_penalty: default_score_spread_penalty(),
            score_slippage_penalty: default_score_slippage_penalty(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.books_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        self.analytics().validate()
    }

    /// Analytics parameters threaded into the metrics orchestrator.
    pub fn analytics(&self) -> AnalyticsConfig {
        let reference_budget_index = self
            .reference_budget_index
            .unwrap_or(self.budgets.len() / 2);

        AnalyticsConfig {
            top_levels_per_side: self.top_levels_per_side,
            depth_band: self.depth_band,
            budgets: self.budgets.clone(),
            reference_budget_index,
            score_weights: ScoreWeights {
                depth_divisor: self.score_depth_divisor,
                spread_penalty: self.score_spread_penalty,
                slippage_penalty: self.score_slippage_penalty,
            },
        }
    }

    /// Pause between book batches.
    pub fn books_batch_pause(&self) -> Duration {
        Duration::from_millis(self.books_batch_pause_ms)
    }

    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

/// Parameters of the liquidity analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Levels per side in the level export.
    pub top_levels_per_side: usize,
    /// Half-width of the depth band around the midpoint.
    pub depth_band: Decimal,
    /// Cash budgets simulated against the ask side.
    pub budgets: Vec<Decimal>,
    /// Which budget's slippage feeds the score.
    pub reference_budget_index: usize,
    /// Weights of the composite score.
    pub score_weights: ScoreWeights,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let budgets = default_budgets();
        Self {
            top_levels_per_side: default_top_levels_per_side(),
            depth_band: default_depth_band(),
            reference_budget_index: budgets.len() / 2,
            budgets,
            score_weights: ScoreWeights::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Reject parameter sets the analytics cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budgets.is_empty() {
            return Err(ConfigError::NoBudgets);
        }

        if let Some(bad) = self.budgets.iter().find(|b| **b <= Decimal::ZERO) {
            return Err(ConfigError::NonPositiveBudget(*bad));
        }

        if self.reference_budget_index >= self.budgets.len() {
            return Err(ConfigError::ReferenceIndexOutOfRange {
                index: self.reference_budget_index,
                len: self.budgets.len(),
            });
        }

        if self.depth_band < Decimal::ZERO {
            return Err(ConfigError::NegativeDepthBand(self.depth_band));
        }

        let weights = &self.score_weights;
        if weights.depth_divisor <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveDepthDivisor(weights.depth_divisor));
        }

        if let Some(bad) = [weights.spread_penalty, weights.slippage_penalty]
            .into_iter()
            .find(|p| *p < Decimal::ZERO)
        {
            return Err(ConfigError::NegativeScorePenalty(bad));
        }

        Ok(())
    }

    /// The budget whose slippage is used for scoring.
    pub fn reference_budget(&self) -> Option<Decimal> {
        self.budgets.get(self.reference_budget_index).copied()
    }
}
