use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use casesync::{config::RemoteConfig, pipeline, remote::SupabaseStore};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Conventional name of the raw report when no path argument is given.
const DEFAULT_REPORT: &str = "Report_316.xlsx";
const ARCHIVE_DIR: &str = "data/daily_submissions";

fn main() -> Result<()> {
    // ─── 1) init logging + env ───────────────────────────────────────
    dotenvy::dotenv().ok();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) resolve the input report ─────────────────────────────────
    let input: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT));
    if !input.is_file() {
        anyhow::bail!("could not find report file {}", input.display());
    }

    // ─── 3) connect the remote store ─────────────────────────────────
    let config = RemoteConfig::from_env()?;
    let store = SupabaseStore::new(&config)?;

    // ─── 4) run the daily pipeline ───────────────────────────────────
    info!(file = %input.display(), "starting daily submission run");
    let report = pipeline::process_report(&input, &store, Path::new(ARCHIVE_DIR))?;

    info!(
        records = report.records,
        synced = report.summary.synced,
        skipped = report.summary.skipped,
        failed = report.summary.failed,
        snapshot = %report.snapshot.display(),
        "run complete"
    );
    println!(
        "Processed {} records ({} synced, {} skipped, {} failed). Clean report saved at {}",
        report.records,
        report.summary.synced,
        report.summary.skipped,
        report.summary.failed,
        report.snapshot.display()
    );
    Ok(())
}
