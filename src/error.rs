//! Unified error types for the snapshot and analytics pipeline.

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration validation error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Market / order book fetch error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Snapshot storage or export error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No execution budgets configured.
    #[error("at least one execution budget is required")]
    NoBudgets,

    /// A budget is zero or negative.
    #[error("execution budgets must be positive, got {0}")]
    NonPositiveBudget(Decimal),

    /// Reference budget index points past the budget list.
    #[error("reference budget index {index} out of range for {len} budgets")]
    ReferenceIndexOutOfRange {
        /// Configured index.
        index: usize,
        /// Number of budgets.
        len: usize,
    },

    /// Depth band half-width is negative.
    #[error("depth band must not be negative, got {0}")]
    NegativeDepthBand(Decimal),

    /// Score depth divisor is zero or negative.
    #[error("score depth divisor must be positive, got {0}")]
    NonPositiveDepthDivisor(Decimal),

    /// Score spread or slippage penalty is negative.
    #[error("score penalties must not be negative, got {0}")]
    NegativeScorePenalty(Decimal),

    /// Book batch size of zero.
    #[error("books batch size must be at least 1")]
    ZeroBatchSize,
}

/// Upstream API errors.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Request returned a non-success status.
    #[error("failed to fetch {endpoint}: {reason}")]
    FetchFailed {
        /// Endpoint that failed.
        endpoint: String,
        /// Reason for failure.
        reason: String,
    },

    /// Response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse {
        /// Endpoint that answered.
        endpoint: String,
        /// What was wrong with it.
        reason: String,
    },

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Bronze snapshot and export errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Snapshot base directory does not exist.
    #[error("snapshot base {0} does not exist; run a snapshot first")]
    MissingBase(PathBuf),

    /// Base exists but holds no `date/time` snapshot directories.
    #[error("no snapshots under {0} (expected YYYY-MM-DD/HHMMSS directories)")]
    NoSnapshots(PathBuf),

    /// Order book file is missing from the snapshot.
    #[error("order book file {0} not found")]
    MissingOrderBooks(PathBuf),

    /// Snapshot directory is not laid out as `date/time`.
    #[error("cannot derive snapshot tag from {0}")]
    BadSnapshotPath(PathBuf),

    /// Filesystem error on a specific path.
    #[error("io error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON error on a specific path.
    #[error("json error on {path}: {source}")]
    Json {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot timestamp could not be formatted.
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),

    /// CSV writer error.
    #[error("csv error on {path}: {source}")]
    Csv {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
}

/// Whole-record failures while turning a raw order book into a snapshot.
///
/// These never escape the metrics orchestrator; they only select the
/// absent-metrics fallback record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Record is not a JSON object.
    #[error("order book record is not an object")]
    NotAnObject,

    /// Neither `asset_id` nor `token_id` is present and non-empty.
    #[error("order book record has no asset_id or token_id")]
    MissingIdentity,
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
