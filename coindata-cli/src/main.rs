//! CoinData CLI — incremental BTC/USD bar cache updater.
//!
//! Commands:
//! - `update` — bring both cached series (minute + daily) up to date
//! - `download` — bootstrap a full-history download for one resolution
//! - `status` — report row counts and date ranges of the cached CSVs

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use coindata_core::data::{
    download_series, reconcile, CsvStore, ReconcileOutcome, StdoutProgress, StoreState,
    YahooProvider,
};
use coindata_core::domain::Resolution;
use std::path::{Path, PathBuf};

const MINUTE_FILE: &str = "BTCUSD_minute.csv";
const DAILY_FILE: &str = "BTCUSD_daily.csv";

/// Default lookback when a series has no prior data: 7 days of minute bars,
/// 30 days of daily bars.
fn default_lookback(resolution: Resolution) -> Duration {
    match resolution {
        Resolution::Minute => Duration::days(7),
        Resolution::Daily => Duration::days(30),
    }
}

#[derive(Parser)]
#[command(name = "coindata", about = "CoinData CLI — incremental BTC/USD bar cache")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResolutionArg {
    Minute,
    Daily,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Minute => Resolution::Minute,
            ResolutionArg::Daily => Resolution::Daily,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Bring both cached series up to date, appending only new rows.
    Update {
        /// Data directory holding the CSV caches.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Instrument symbol to fetch.
        #[arg(long, default_value = "BTC-USD")]
        instrument: String,
    },
    /// Download full history for one resolution, replacing the cached file.
    Download {
        /// Data directory holding the CSV caches.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Instrument symbol to fetch.
        #[arg(long, default_value = "BTC-USD")]
        instrument: String,

        /// Resolution to download.
        #[arg(long, value_enum, default_value = "minute")]
        resolution: ResolutionArg,

        /// How many days of history to fetch.
        #[arg(long, default_value_t = 90)]
        days: i64,
    },
    /// Report row counts and date ranges of the cached CSVs.
    Status {
        /// Data directory holding the CSV caches.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Update {
            data_dir,
            instrument,
        } => run_update(&data_dir, &instrument),
        Commands::Download {
            data_dir,
            instrument,
            resolution,
            days,
        } => run_download(&data_dir, &instrument, resolution.into(), days),
        Commands::Status { data_dir } => run_status(&data_dir),
    }
}

fn series_file(data_dir: &Path, resolution: Resolution) -> PathBuf {
    match resolution {
        Resolution::Minute => data_dir.join(MINUTE_FILE),
        Resolution::Daily => data_dir.join(DAILY_FILE),
    }
}

fn run_update(data_dir: &Path, instrument: &str) -> Result<()> {
    let provider = YahooProvider::new();
    let progress = StdoutProgress;

    println!("{instrument} data updater");
    println!("{}", "=".repeat(50));

    let mut succeeded = 0;
    for resolution in [Resolution::Minute, Resolution::Daily] {
        let store = CsvStore::new(series_file(data_dir, resolution));

        let ok = match reconcile(
            &provider,
            &store,
            instrument,
            resolution,
            default_lookback(resolution),
            &progress,
        ) {
            Ok(ReconcileOutcome::Updated { appended, total }) => {
                println!("{resolution}: added {appended} new rows ({total} total)");
                true
            }
            Ok(ReconcileOutcome::UpToDate { total }) => {
                println!("{resolution}: already up to date ({total} rows)");
                true
            }
            Ok(ReconcileOutcome::NoData) => {
                println!("{resolution}: no data available from provider");
                false
            }
            Err(e) => {
                eprintln!("{resolution}: update failed: {e}");
                false
            }
        };
        if ok {
            succeeded += 1;
        }
        println!();
    }

    println!("Update complete: {succeeded}/2 datasets updated successfully.");

    if succeeded < 2 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_download(data_dir: &Path, instrument: &str, resolution: Resolution, days: i64) -> Result<()> {
    let provider = YahooProvider::new();
    let store = CsvStore::new(series_file(data_dir, resolution));

    match download_series(
        &provider,
        &store,
        instrument,
        resolution,
        Duration::days(days),
        Utc::now(),
        &StdoutProgress,
    ) {
        Ok(0) => {
            eprintln!("No data was downloaded; the cached file was left untouched.");
            std::process::exit(1);
        }
        Ok(rows) => {
            println!("Downloaded {rows} rows to {}", store.path().display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Download failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run_status(data_dir: &Path) -> Result<()> {
    for resolution in [Resolution::Minute, Resolution::Daily] {
        let path = series_file(data_dir, resolution);
        let store = CsvStore::new(&path);

        match store.load() {
            StoreState::Absent => {
                println!("{resolution:>6}: no data ({})", path.display());
            }
            StoreState::Unreadable(reason) => {
                println!("{resolution:>6}: UNREADABLE ({reason})");
            }
            StoreState::Loaded(bars) => {
                let first = bars.first().map(|b| b.timestamp);
                let last = bars.last().map(|b| b.timestamp);
                let (min_close, max_close) = bars.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), b| (lo.min(b.close), hi.max(b.close)),
                );
                println!(
                    "{resolution:>6}: {} rows, {} to {}, close ${min_close:.2} - ${max_close:.2}",
                    bars.len(),
                    first.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    last.map(|t| t.to_rfc3339()).unwrap_or_default(),
                );
            }
        }
    }
    Ok(())
}
