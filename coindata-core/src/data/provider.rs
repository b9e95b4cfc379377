//! Provider trait, structured error types, and progress reporting.
//!
//! The BarProvider trait abstracts over market-data sources so the reconciler
//! can be exercised against a scripted provider in tests.

use crate::domain::{Bar, Resolution};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Structured error types for fetch/store operations.
///
/// These are designed to be displayable in CLI output as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("instrument not found: {instrument}")]
    InstrumentNotFound { instrument: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Trait for market-data sources (Yahoo Finance chart API, mocks in tests).
///
/// Implementations fetch raw bars for a half-open window `[start, end)`.
/// An empty `Vec` means the provider has no data in the range — that is not
/// an error. Callers are responsible for chunking wide minute-resolution
/// windows; implementations serve exactly the window they are given.
pub trait BarProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for an instrument over `[start, end)` at the given resolution.
    fn fetch_bars(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<Vec<Bar>, DataError>;
}

/// Progress callbacks for a reconcile/download run.
///
/// One fetch may span several sub-windows at minute resolution; each gets its
/// own callback. A failed sub-window is reported here and then skipped — the
/// run continues with the remaining windows.
pub trait UpdateProgress: Send {
    /// Called once before the first window is requested.
    fn on_fetch_start(
        &self,
        instrument: &str,
        resolution: Resolution,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    );

    /// Called when one sub-window has been fetched.
    fn on_window_fetched(&self, start: DateTime<Utc>, end: DateTime<Utc>, rows: usize);

    /// Called when fetching one sub-window failed (the run continues).
    fn on_window_failed(&self, start: DateTime<Utc>, end: DateTime<Utc>, err: &DataError);

    /// Called when a store file exists but cannot be read; the run falls back
    /// to a full default-lookback fetch.
    fn on_store_unreadable(&self, reason: &str);
}

/// Progress reporter that prints to stdout/stderr.
pub struct StdoutProgress;

impl UpdateProgress for StdoutProgress {
    fn on_fetch_start(
        &self,
        instrument: &str,
        resolution: Resolution,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        println!(
            "Downloading {resolution} data for {instrument}: {} to {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M"),
        );
    }

    fn on_window_fetched(&self, start: DateTime<Utc>, end: DateTime<Utc>, rows: usize) {
        println!(
            "  fetched {rows} rows: {} to {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
    }

    fn on_window_failed(&self, start: DateTime<Utc>, end: DateTime<Utc>, err: &DataError) {
        eprintln!(
            "WARNING: failed to fetch window {} to {}: {err}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        );
    }

    fn on_store_unreadable(&self, reason: &str) {
        eprintln!("WARNING: existing store is unreadable ({reason}); re-fetching default lookback");
    }
}

/// Silent progress reporter for tests.
pub struct NullProgress;

impl UpdateProgress for NullProgress {
    fn on_fetch_start(&self, _: &str, _: Resolution, _: DateTime<Utc>, _: DateTime<Utc>) {}
    fn on_window_fetched(&self, _: DateTime<Utc>, _: DateTime<Utc>, _: usize) {}
    fn on_window_failed(&self, _: DateTime<Utc>, _: DateTime<Utc>, _: &DataError) {}
    fn on_store_unreadable(&self, _: &str) {}
}
