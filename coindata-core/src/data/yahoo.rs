//! Yahoo Finance chart-API provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart endpoint at minute or daily
//! resolution. Yahoo has no official API and is subject to unannounced format
//! changes; parse failures surface as `DataError::ResponseFormat`.
//!
//! One HTTP attempt per window — recovery policy (skip the window, keep the
//! rest) lives in the reconciler, not here.

use super::provider::{BarProvider, DataError};
use crate::domain::{Bar, Resolution};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Build the chart API URL for an instrument, window, and resolution.
    fn chart_url(
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> String {
        let period1 = start.timestamp();
        let period2 = end.timestamp();
        let interval = resolution.interval();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{instrument}\
             ?period1={period1}&period2={period2}&interval={interval}"
        )
    }

    /// Parse the chart API response into raw bars.
    ///
    /// An in-range response with no timestamps means "no data in this window"
    /// and parses to an empty Vec, not an error.
    fn parse_response(instrument: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let result = match resp.chart.result {
            Some(r) => r,
            None => {
                return match resp.chart.error {
                    Some(err) if err.code == "Not Found" => Err(DataError::InstrumentNotFound {
                        instrument: instrument.to_string(),
                    }),
                    Some(err) => Err(DataError::Provider(format!(
                        "{}: {}",
                        err.code, err.description
                    ))),
                    None => Err(DataError::ResponseFormat(
                        "empty result with no error".into(),
                    )),
                };
            }
        };

        let data = match result.into_iter().next() {
            Some(d) => d,
            None => return Ok(Vec::new()),
        };

        let timestamps = match data.timestamp {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(Vec::new()),
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormat("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| DataError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Skip all-null rows (provider gaps)
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(Bar::raw(
                timestamp,
                open.unwrap_or(f64::NAN),
                high.unwrap_or(f64::NAN),
                low.unwrap_or(f64::NAN),
                close.unwrap_or(f64::NAN),
                volume.unwrap_or(0),
            ));
        }

        Ok(bars)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BarProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<Vec<Bar>, DataError> {
        let url = Self::chart_url(instrument, start, end, resolution);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::Provider(format!(
                "HTTP {status} for {instrument}"
            )));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormat(format!("failed to parse response for {instrument}: {e}"))
        })?;

        Self::parse_response(instrument, chart)
    }
}
