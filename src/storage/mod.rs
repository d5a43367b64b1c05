//! On-disk layout of the pipeline.
//!
//! This module handles:
//! - Bronze snapshot directories (raw markets, books, price history)
//! - Stream-mode JSONL appends with a cached token list
//! - Silver level and gold metrics CSV exports

pub mod export;
pub mod snapshot;
pub mod stream;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub use export::{gold_path, silver_path, write_levels_csv, write_metrics_csv};
pub use snapshot::{find_latest_snapshot, BronzeSnapshot};
pub use stream::StreamStore;

pub(crate) fn create_dir(path: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, creating parent directories.
pub(crate) fn write_json_pretty<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }

    let body = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, body).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let body = fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&body).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}
