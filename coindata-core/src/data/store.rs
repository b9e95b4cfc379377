//! CSV store — one series per file, atomic writes.
//!
//! Layout: a flat CSV with header
//! `timestamp,Open,High,Low,Close,Volume,Returns,Price_Range,VWAP`.
//!
//! Writes are atomic: serialize to `{path}.tmp`, then rename into place, so a
//! crash mid-write never leaves a truncated store.

use super::provider::DataError;
use crate::domain::Bar;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// What loading a store file found.
///
/// `Unreadable` is kept distinct from `Absent` so callers can warn before
/// falling back to a full re-fetch — losing that distinction silently would
/// hide store corruption.
#[derive(Debug)]
pub enum StoreState {
    /// No file at the path, or a file with no data rows.
    Absent,
    /// A file exists but could not be parsed as a bar series.
    Unreadable(String),
    /// Parsed rows, in file order.
    Loaded(Vec<Bar>),
}

/// A persisted bar series at a fixed path.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted series.
    ///
    /// Missing files and empty files (header only) are both `Absent`. Parse
    /// failures — including a missing `timestamp` column — are `Unreadable`.
    pub fn load(&self) -> StoreState {
        if !self.path.exists() {
            return StoreState::Absent;
        }

        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(r) => r,
            Err(e) => return StoreState::Unreadable(e.to_string()),
        };

        let mut bars = Vec::new();
        for row in reader.deserialize::<Bar>() {
            match row {
                Ok(bar) => bars.push(bar),
                Err(e) => return StoreState::Unreadable(e.to_string()),
            }
        }

        if bars.is_empty() {
            StoreState::Absent
        } else {
            StoreState::Loaded(bars)
        }
    }

    /// Maximum timestamp in a loaded series (the low-water mark).
    pub fn last_timestamp(bars: &[Bar]) -> Option<DateTime<Utc>> {
        bars.iter().map(|b| b.timestamp).max()
    }

    /// Persist the series, replacing any previous contents atomically.
    pub fn write(&self, bars: &[Bar]) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| DataError::Store(format!("failed to create dir: {e}")))?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp_path)
                .map_err(|e| DataError::Store(format!("create temp file: {e}")))?;
            for bar in bars {
                writer
                    .serialize(bar)
                    .map_err(|e| DataError::Store(format!("serialize row: {e}")))?;
            }
            writer
                .flush()
                .map_err(|e| DataError::Store(format!("flush: {e}")))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Store(format!("atomic rename failed: {e}"))
        })?;

        Ok(())
    }
}
