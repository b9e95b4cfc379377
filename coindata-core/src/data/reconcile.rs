//! Incremental series reconciliation.
//!
//! `reconcile` brings a persisted series up to date with the provider,
//! touching only the minimal new range: find the low-water mark, fetch from
//! one hour before it (overlap margin for provider boundary revisions),
//! keep only strictly newer rows, and persist atomically. History is never
//! truncated; duplicates are never introduced.
//!
//! Single-threaded, blocking, no retries — a failed minute-resolution
//! sub-window is reported and skipped, and that is the entire recovery policy.

use super::derive::apply_derived;
use super::provider::{BarProvider, DataError, UpdateProgress};
use super::store::{CsvStore, StoreState};
use super::window::split_windows;
use crate::domain::{Bar, Resolution};
use chrono::{DateTime, Duration, Utc};

/// Overlap subtracted from the low-water mark when computing the fetch start.
///
/// Providers occasionally revise the most recent bars; re-fetching the last
/// hour and filtering with a strict `>` guarantees no gap at the boundary
/// without re-inserting known rows.
pub fn overlap_margin() -> Duration {
    Duration::hours(1)
}

/// Result of a reconcile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// New rows were appended (or a fresh store was created).
    Updated { appended: usize, total: usize },
    /// The provider returned rows, but none newer than the low-water mark.
    /// The store file is left untouched.
    UpToDate { total: usize },
    /// The fetch yielded zero rows across all sub-windows.
    NoData,
}

/// Reconcile using the current wall clock as the fetch end.
pub fn reconcile(
    provider: &dyn BarProvider,
    store: &CsvStore,
    instrument: &str,
    resolution: Resolution,
    default_lookback: Duration,
    progress: &dyn UpdateProgress,
) -> Result<ReconcileOutcome, DataError> {
    reconcile_at(
        provider,
        store,
        instrument,
        resolution,
        default_lookback,
        Utc::now(),
        progress,
    )
}

/// Reconcile with an explicit `now`, for deterministic tests.
pub fn reconcile_at(
    provider: &dyn BarProvider,
    store: &CsvStore,
    instrument: &str,
    resolution: Resolution,
    default_lookback: Duration,
    now: DateTime<Utc>,
    progress: &dyn UpdateProgress,
) -> Result<ReconcileOutcome, DataError> {
    let existing = match store.load() {
        StoreState::Loaded(bars) => Some(bars),
        StoreState::Absent => None,
        StoreState::Unreadable(reason) => {
            // Recover by re-fetching the default lookback; the warning keeps
            // "corrupt store" distinguishable from "no store".
            progress.on_store_unreadable(&reason);
            None
        }
    };

    let last_seen = existing.as_deref().and_then(CsvStore::last_timestamp);
    let start = match last_seen {
        Some(t) => t - overlap_margin(),
        None => now - default_lookback,
    };

    let mut fetched = fetch_range(provider, instrument, resolution, start, now, progress)?;
    if fetched.is_empty() {
        return Ok(ReconcileOutcome::NoData);
    }

    dedup_sort(&mut fetched);
    apply_derived(&mut fetched);

    match (existing, last_seen) {
        (Some(existing), Some(last_seen)) => {
            let (merged, appended) = merge_with_existing(existing, fetched, last_seen);
            if appended == 0 {
                return Ok(ReconcileOutcome::UpToDate {
                    total: merged.len(),
                });
            }
            store.write(&merged)?;
            Ok(ReconcileOutcome::Updated {
                appended,
                total: merged.len(),
            })
        }
        _ => {
            store.write(&fetched)?;
            Ok(ReconcileOutcome::Updated {
                appended: fetched.len(),
                total: fetched.len(),
            })
        }
    }
}

/// Fetch `[start, end)`, splitting into provider-sized sub-windows when the
/// resolution requires it.
///
/// A failed sub-window is reported through `progress` and skipped; the
/// remaining windows still run. An unchunked (daily) fetch propagates its
/// error, since there is nothing to salvage from the run.
pub fn fetch_range(
    provider: &dyn BarProvider,
    instrument: &str,
    resolution: Resolution,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    progress: &dyn UpdateProgress,
) -> Result<Vec<Bar>, DataError> {
    progress.on_fetch_start(instrument, resolution, start, end);

    let max_span = match resolution.max_fetch_span() {
        None => {
            let bars = provider.fetch_bars(instrument, start, end, resolution)?;
            progress.on_window_fetched(start, end, bars.len());
            return Ok(bars);
        }
        Some(span) => span,
    };

    let mut all = Vec::new();
    for (window_start, window_end) in split_windows(start, end, max_span) {
        match provider.fetch_bars(instrument, window_start, window_end, resolution) {
            Ok(rows) => {
                progress.on_window_fetched(window_start, window_end, rows.len());
                all.extend(rows);
            }
            Err(e) => progress.on_window_failed(window_start, window_end, &e),
        }
    }

    Ok(all)
}

/// Sort ascending by timestamp and drop duplicate timestamps, keeping the
/// first occurrence. The sort is stable, so "first" means fetch order for
/// rows sharing a timestamp.
pub fn dedup_sort(bars: &mut Vec<Bar>) {
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
}

/// Merge freshly fetched rows into an existing series.
///
/// Only rows strictly newer than `last_seen` are considered; on a timestamp
/// collision the existing row wins. Returns the merged series (sorted,
/// duplicate-free) and the number of appended rows.
pub fn merge_with_existing(
    existing: Vec<Bar>,
    fresh: Vec<Bar>,
    last_seen: DateTime<Utc>,
) -> (Vec<Bar>, usize) {
    let before = existing.len();

    let mut merged = existing;
    merged.extend(fresh.into_iter().filter(|b| b.timestamp > last_seen));
    merged.sort_by_key(|b| b.timestamp);
    merged.dedup_by_key(|b| b.timestamp);

    let appended = merged.len().saturating_sub(before);
    (merged, appended)
}
