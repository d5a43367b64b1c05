//! Stream-mode storage: cached token selection and daily JSONL snapshot files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{create_dir, read_json, write_json_pretty};
use crate::error::StorageError;
use crate::market::SelectedMarket;

const TOKENS_FILE: &str = "tokens_top.json";
const MARKETS_FILE: &str = "markets_top.json";

/// One line of a `books_snapshots_YYYY-MM-DD.jsonl` file.
#[derive(Debug, Serialize)]
struct StreamLine<'a> {
    snapshot_ts_utc: String,
    token_count: usize,
    books_count: usize,
    books: &'a [Value],
}

/// `{data}/bronze/polymarket_stream/`.
#[derive(Debug, Clone)]
pub struct StreamStore {
    root: PathBuf,
}

impl StreamStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join("bronze").join("polymarket_stream"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.root.join(TOKENS_FILE)
    }

    pub fn markets_path(&self) -> PathBuf {
        self.root.join(MARKETS_FILE)
    }

    /// Cached token list, if the file exists and is younger than `max_age`.
    ///
    /// An unreadable cache counts as a miss.
    pub fn cached_tokens(&self, max_age: Duration) -> Option<Vec<String>> {
        let path = self.tokens_path();
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age >= max_age {
            debug!(age_secs = age.as_secs(), "Token cache expired");
            return None;
        }

        match read_json::<Vec<String>>(&path) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token cache");
                None
            }
        }
    }

    /// Persist the market selection and its token list.
    pub fn save_selection(
        &self,
        markets: &[SelectedMarket],
        token_ids: &[String],
    ) -> Result<(), StorageError> {
        write_json_pretty(&self.markets_path(), markets)?;
        write_json_pretty(&self.tokens_path(), token_ids)
    }

    /// Path of the JSONL file for the UTC day of `now`.
    pub fn day_file(&self, now: OffsetDateTime) -> Result<PathBuf, StorageError> {
        let day = now.format(format_description!("[year]-[month]-[day]"))?;
        Ok(self.root.join(format!("books_snapshots_{}.jsonl", day)))
    }

    /// Append one snapshot line; returns the file written.
    pub fn append_snapshot(
        &self,
        now: OffsetDateTime,
        token_count: usize,
        books: &[Value],
    ) -> Result<PathBuf, StorageError> {
        create_dir(&self.root)?;
        let path = self.day_file(now)?;

        let line = StreamLine {
            snapshot_ts_utc: now.format(&Rfc3339)?,
            token_count,
            books_count: books.len(),
            books,
        };

        let mut body = serde_json::to_vec(&line).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        body.push(b'\n');

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(&body))
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}
