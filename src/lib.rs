//! Polymarket order book liquidity analytics.
//!
//! Snapshots the order books of the highest-volume Polymarket markets and turns
//! each book into a per-token liquidity record:
//!
//! ```text
//! best bid / best ask -> midpoint, spread
//! depth within +/- band of mid
//! buy-side slippage for a set of cash budgets
//! composite score = depth/1000 - 3*spread - 4*slippage
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`orderbook`]: Level parsing, top-of-book and book-walk primitives
//! - [`analytics`]: Score composition and the metrics orchestrator
//! - [`market`]: Market selection and the Polymarket client
//! - [`storage`]: Bronze snapshots, stream appends and CSV exports
//! - [`pipeline`]: Snapshot, stream and analyze runs
//! - [`metrics`]: Pipeline counters and latency histograms

pub mod analytics;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod orderbook;
pub mod pipeline;
pub mod storage;

pub use config::{AnalyticsConfig, Config};
pub use error::{PipelineError, Result};
