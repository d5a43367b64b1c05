//! Bronze snapshot directories.
//!
//! ```text
//! {data}/bronze/polymarket/YYYY-MM-DD/HHMMSS/
//!     markets/markets_top.json
//!     books/orderbooks.json
//!     prices_history/{token_id}.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

use super::{create_dir, read_json, write_json_pretty};
use crate::error::StorageError;
use crate::market::SelectedMarket;

const MARKETS_DIR: &str = "markets";
const BOOKS_DIR: &str = "books";
const PRICES_HISTORY_DIR: &str = "prices_history";
const MARKETS_FILE: &str = "markets_top.json";
const BOOKS_FILE: &str = "orderbooks.json";

/// Root of all bronze snapshots under a data directory.
pub fn bronze_base(data_dir: &Path) -> PathBuf {
    data_dir.join("bronze").join("polymarket")
}

/// One timestamped snapshot directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BronzeSnapshot {
    root: PathBuf,
}

impl BronzeSnapshot {
    /// Create the directory tree for a snapshot taken at `now` (UTC).
    pub fn create(data_dir: &Path, now: OffsetDateTime) -> Result<Self, StorageError> {
        let date = now.format(format_description!("[year]-[month]-[day]"))?;
        let time = now.format(format_description!("[hour][minute][second]"))?;
        let root = bronze_base(data_dir).join(date).join(time);

        for sub in [MARKETS_DIR, BOOKS_DIR, PRICES_HISTORY_DIR] {
            create_dir(&root.join(sub))?;
        }

        debug!(path = %root.display(), "Created bronze snapshot");
        Ok(Self { root })
    }

    /// Open an existing snapshot directory.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn markets_path(&self) -> PathBuf {
        self.root.join(MARKETS_DIR).join(MARKETS_FILE)
    }

    pub fn books_path(&self) -> PathBuf {
        self.root.join(BOOKS_DIR).join(BOOKS_FILE)
    }

    pub fn price_history_path(&self, token_id: &str) -> PathBuf {
        self.root
            .join(PRICES_HISTORY_DIR)
            .join(format!("{}.json", token_id))
    }

    pub fn write_markets(&self, markets: &[SelectedMarket]) -> Result<PathBuf, StorageError> {
        let path = self.markets_path();
        write_json_pretty(&path, markets)?;
        Ok(path)
    }

    pub fn write_order_books(&self, books: &[Value]) -> Result<PathBuf, StorageError> {
        let path = self.books_path();
        write_json_pretty(&path, books)?;
        Ok(path)
    }

    pub fn write_price_history(
        &self,
        token_id: &str,
        history: &Value,
    ) -> Result<PathBuf, StorageError> {
        let path = self.price_history_path(token_id);
        write_json_pretty(&path, history)?;
        Ok(path)
    }

    /// Raw order book records of this snapshot.
    ///
    /// A file holding a single object yields one record.
    pub fn load_order_books(&self) -> Result<Vec<Value>, StorageError> {
        let path = self.books_path();
        if !path.is_file() {
            return Err(StorageError::MissingOrderBooks(path));
        }

        match read_json::<Value>(&path)? {
            Value::Array(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    /// `YYYY-MM-DD_HHMMSS`, taken from the two directory names.
    pub fn tag(&self) -> Result<String, StorageError> {
        let time = dir_name(&self.root);
        let date = self.root.parent().and_then(dir_name);

        match (date, time) {
            (Some(date), Some(time)) => Ok(format!("{}_{}", date, time)),
            _ => Err(StorageError::BadSnapshotPath(self.root.clone())),
        }
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Subdirectory names, ignoring files and non-UTF-8 names.
fn subdirs(path: &Path) -> Result<Vec<String>, StorageError> {
    let entries = fs::read_dir(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Most recent snapshot: lexicographic max date directory, then max time directory.
///
/// A date directory with no time directories is skipped in favor of an earlier one.
pub fn find_latest_snapshot(data_dir: &Path) -> Result<BronzeSnapshot, StorageError> {
    let base = bronze_base(data_dir);
    if !base.is_dir() {
        return Err(StorageError::MissingBase(base));
    }

    let mut dates = subdirs(&base)?;
    dates.sort();

    for date in dates.iter().rev() {
        let date_dir = base.join(date);
        if let Some(time) = subdirs(&date_dir)?.into_iter().max() {
            return Ok(BronzeSnapshot::open(date_dir.join(time)));
        }
    }

    Err(StorageError::NoSnapshots(base))
}
