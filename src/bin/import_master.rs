use std::env;
use std::path::PathBuf;

use anyhow::Result;
use casesync::{config::RemoteConfig, pipeline, remote::SupabaseStore};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_MASTER: &str = "Master Listing.xlsx";

/// Import the agent master listing into the remote `profiles` collection.
/// Run this before the daily report sync: the master listing is what the
/// report's agent codes are validated against.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let input: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MASTER));
    if !input.is_file() {
        anyhow::bail!("could not find master listing {}", input.display());
    }

    let config = RemoteConfig::from_env()?;
    let store = SupabaseStore::new(&config)?;

    info!(file = %input.display(), "starting master listing import");
    let summary = pipeline::import_master(&input, &store)?;

    info!(
        agents = summary.processed,
        synced = summary.synced,
        failed = summary.failed,
        "master listing import complete"
    );
    println!(
        "Imported {} of {} agents ({} failed)",
        summary.synced, summary.processed, summary.failed
    );
    Ok(())
}
