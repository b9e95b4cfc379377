//! Fetching, storage, and incremental reconciliation.

pub mod derive;
pub mod download;
pub mod provider;
pub mod reconcile;
pub mod store;
pub mod window;
pub mod yahoo;

pub use download::download_series;
pub use provider::{BarProvider, DataError, NullProgress, StdoutProgress, UpdateProgress};
pub use reconcile::{reconcile, reconcile_at, ReconcileOutcome};
pub use store::{CsvStore, StoreState};
pub use yahoo::YahooProvider;
