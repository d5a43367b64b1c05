//! Silver level and gold metrics CSV exports.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::info;

use super::create_dir;
use crate::analytics::{LevelExportRow, MetricsRecord};
use crate::error::StorageError;

const LEVEL_HEADERS: [&str; 6] = ["snapshot_ts", "token_id", "side", "level", "price", "size"];

pub fn silver_path(data_dir: &Path, tag: &str) -> PathBuf {
    data_dir
        .join("silver")
        .join(format!("orderbook_levels_{}.csv", tag))
}

pub fn gold_path(data_dir: &Path, tag: &str) -> PathBuf {
    data_dir.join("gold").join(format!("metrics_{}.csv", tag))
}

/// Header of the slippage column for one budget, e.g. `slippage_buy_50`.
pub fn slippage_column(budget: Decimal) -> String {
    format!("slippage_buy_{}", budget.normalize())
}

fn cell(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, StorageError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }

    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|source| csv_error(path, source))
}

fn csv_error(path: &Path, source: csv::Error) -> StorageError {
    StorageError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn flush(mut wtr: csv::Writer<std::fs::File>, path: &Path) -> Result<(), StorageError> {
    wtr.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the silver level table. The header is written even with no rows.
pub fn write_levels_csv(path: &Path, rows: &[LevelExportRow]) -> Result<usize, StorageError> {
    let mut wtr = writer(path)?;
    wtr.write_record(LEVEL_HEADERS)
        .map_err(|e| csv_error(path, e))?;

    for row in rows {
        wtr.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    flush(wtr, path)?;

    info!(path = %path.display(), rows = rows.len(), "Wrote level export");
    Ok(rows.len())
}

/// Write the gold metrics table with one slippage column per budget.
///
/// Absent metrics are empty cells.
pub fn write_metrics_csv(
    path: &Path,
    records: &[MetricsRecord],
    budgets: &[Decimal],
) -> Result<usize, StorageError> {
    let mut wtr = writer(path)?;

    let mut header: Vec<String> = ["snapshot_ts", "token_id", "best_bid", "best_ask", "mid", "spread", "depth_1pt"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    header.extend(budgets.iter().map(|b| slippage_column(*b)));
    header.push("score".to_string());
    wtr.write_record(&header).map_err(|e| csv_error(path, e))?;

    for r in records {
        let mut row = vec![
            r.snapshot_ts.clone(),
            r.token_id.clone(),
            cell(r.best_bid),
            cell(r.best_ask),
            cell(r.mid),
            cell(r.spread),
            cell(r.depth_in_band),
        ];
        row.extend(budgets.iter().map(|b| cell(r.slippage_for(*b))));
        row.push(cell(r.score));
        wtr.write_record(&row).map_err(|e| csv_error(path, e))?;
    }
    flush(wtr, path)?;

    info!(path = %path.display(), rows = records.len(), "Wrote metrics export");
    Ok(records.len())
}
