//! Liquidity analytics over order book snapshots.
//!
//! This module handles:
//! - Metrics and level-export records
//! - The composite liquidity score
//! - Per-book orchestration and parallel batch analysis

pub mod engine;
pub mod record;
pub mod score;

pub use engine::{analyze_batch, analyze_record, compute_metrics, export_levels, BatchReport, BookAnalysis};
pub use record::{LevelExportRow, MetricsRecord, SlippageEstimate};
pub use score::ScoreWeights;
