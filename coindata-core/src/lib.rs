//! CoinData Core — incremental OHLCV series cache.
//!
//! This crate keeps local CSV files of crypto price bars up to date against a
//! remote market-data provider:
//! - Domain types (bars, resolutions)
//! - Provider trait + Yahoo Finance chart-API implementation
//! - CSV store with atomic writes
//! - The incremental reconciler: fetch only the missing range, merge without
//!   duplicates, never discard history

pub mod data;
pub mod domain;
