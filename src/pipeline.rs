// src/pipeline.rs
//
// Run orchestration for the two batch jobs: the daily submission report and
// the agent master listing. Owns the report-specific column layout; the
// extract/transform/sync modules stay generic.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::archive;
use crate::extract::{self, SheetOptions};
use crate::remote::RemoteStore;
use crate::sync::{self, SyncSummary};
use crate::transform::{self, AgentProfile, CaseRecord};

/// Grouping filter selecting the program's rows out of the full report.
pub const GROUP_COLUMN: &str = "GAM_NAME";
pub const GROUP_PATTERN: &str = "SuperAchiever";

/// Column subset carried through cleaning and into the snapshot, in output
/// order. Columns missing from a given export are dropped, not errors.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "PROPOSAL_STATUS",
    "ENTRY_DATE",
    "PROPOSALNO",
    "RISK_COMMENCEMENT_DATE",
    "AM_NAME",
    "AGENT_NAME",
    "AGENT_CODE",
    "PAYMENT_METHOD",
    "AFYC",
    "Factor",
    "TOTAL_EXPECTED_DUE",
    "POLY_STATUS",
    "POLICYNO",
    "PRODUCT_NAME",
    "PAYMENT_FREQUENCY",
];

/// Columns coerced to numbers, zero-defaulting anything unparseable.
pub const NUMERIC_COLUMNS: &[&str] = &["AFYC", "Factor", "TOTAL_EXPECTED_DUE"];

/// Identifier columns trimmed during cleaning, so the snapshot carries the
/// same keys the synced records do.
pub const KEY_COLUMNS: &[&str] = &["PROPOSALNO", "AGENT_CODE"];

/// The master listing keeps two banner rows above its header.
pub const MASTER_SHEET: &str = "Sheet1";
pub const MASTER_HEADER_OFFSET: usize = 2;

/// What a daily run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Cleaned records in the snapshot (synced or not).
    pub records: usize,
    pub summary: SyncSummary,
    pub snapshot: PathBuf,
}

/// Process one daily submission report end to end: extract, filter to the
/// program's rows, project and clean, sync each case to the remote store,
/// then archive the cleaned set. The snapshot is written even when every
/// upsert failed; only an unreadable source aborts the run.
pub fn process_report(
    path: &Path,
    store: &dyn RemoteStore,
    archive_dir: &Path,
) -> Result<RunReport> {
    let table = extract::read_sheet(path, &SheetOptions::default())?;
    info!(rows = table.rows.len(), file = %path.display(), "loaded report");

    let mut table = table
        .filter_contains(GROUP_COLUMN, GROUP_PATTERN)
        .project(REQUIRED_COLUMNS);
    table.coerce_numeric(NUMERIC_COLUMNS);
    table.trim_text(KEY_COLUMNS);
    info!(rows = table.rows.len(), pattern = GROUP_PATTERN, "filtered report rows");

    let records: Vec<CaseRecord> = table.iter().map(|row| transform::case_record(&row)).collect();
    let summary = sync::sync_cases(store, &records);

    let snapshot = archive::write_snapshot(&table, archive_dir)?;

    Ok(RunReport {
        records: records.len(),
        summary,
        snapshot,
    })
}

/// Import the agent master listing into `profiles`. Rows without an agent
/// code are dropped before syncing.
pub fn import_master(path: &Path, store: &dyn RemoteStore) -> Result<SyncSummary> {
    let options = SheetOptions {
        sheet_name: Some(MASTER_SHEET.to_string()),
        header_offset: MASTER_HEADER_OFFSET,
    };
    let table = extract::read_sheet(path, &options)?;

    let profiles: Vec<AgentProfile> = table
        .iter()
        .filter_map(|row| transform::agent_profile(&row))
        .collect();
    info!(agents = profiles.len(), "found agents in master listing");

    Ok(sync::sync_profiles(store, &profiles))
}
