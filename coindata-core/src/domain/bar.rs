//! Bar — the fundamental market data unit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument at a single instant.
///
/// The serde renames match the persisted CSV header exactly:
/// `timestamp,Open,High,Low,Close,Volume,Returns,Price_Range,VWAP`.
/// Timestamps are UTC and serialize as RFC 3339.
///
/// The derived columns (`returns`, `price_range`, `vwap`) are filled in by
/// [`crate::data::derive::apply_derived`] after a fetch; a freshly parsed bar
/// carries placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    /// Close-over-previous-close change within the fetch window. `None` for
    /// the window's first row (serialized as an empty cell, like pandas NaN).
    #[serde(rename = "Returns")]
    pub returns: Option<f64>,
    #[serde(rename = "Price_Range")]
    pub price_range: f64,
    #[serde(rename = "VWAP")]
    pub vwap: f64,
}

impl Bar {
    /// A bar with only the raw OHLCV fields set; derived columns zeroed.
    pub fn raw(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            returns: None,
            price_range: 0.0,
            vwap: 0.0,
        }
    }
}

/// Sampling granularity of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Minute,
    Daily,
}

impl Resolution {
    /// Interval token used by the Yahoo chart API.
    pub fn interval(&self) -> &'static str {
        match self {
            Resolution::Minute => "1m",
            Resolution::Daily => "1d",
        }
    }

    /// Maximum span the provider serves in one request, if limited.
    ///
    /// Yahoo caps minute-resolution requests at 7 days; wider spans must be
    /// split into consecutive sub-windows. Daily requests are unconstrained.
    pub fn max_fetch_span(&self) -> Option<Duration> {
        match self {
            Resolution::Minute => Some(Duration::days(7)),
            Resolution::Daily => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Resolution::Minute => "minute",
            Resolution::Daily => "daily",
        })
    }
}
