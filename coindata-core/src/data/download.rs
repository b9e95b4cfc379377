//! Full-history bootstrap download.

use super::derive::apply_derived;
use super::provider::{BarProvider, DataError, UpdateProgress};
use super::reconcile::{dedup_sort, fetch_range};
use super::store::CsvStore;
use crate::domain::Resolution;
use chrono::{DateTime, Duration, Utc};

/// Fetch the last `lookback` of history and write it as the store contents,
/// replacing whatever was there. Returns the number of rows written; zero
/// means the provider had nothing in the range and the store was not touched.
///
/// This is the initial-seed path. For day-to-day updates use
/// [`super::reconcile::reconcile`], which only appends.
pub fn download_series(
    provider: &dyn BarProvider,
    store: &CsvStore,
    instrument: &str,
    resolution: Resolution,
    lookback: Duration,
    now: DateTime<Utc>,
    progress: &dyn UpdateProgress,
) -> Result<usize, DataError> {
    let start = now - lookback;
    let mut bars = fetch_range(provider, instrument, resolution, start, now, progress)?;

    if bars.is_empty() {
        return Ok(0);
    }

    dedup_sort(&mut bars);
    apply_derived(&mut bars);
    store.write(&bars)?;

    Ok(bars.len())
}
