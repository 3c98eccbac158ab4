// src/sync/mod.rs
//
// Reconciliation core: validate each record's foreign key against the
// remote reference set, then upsert by natural key. Failures are isolated
// per record; the batch always runs to the end.

use tracing::{error, warn};

use crate::remote::RemoteStore;
use crate::transform::{AgentProfile, CaseRecord};

/// Per-batch tally. `processed` counts every record offered;
/// `skipped` counts foreign-key rejections; `failed` counts remote errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub processed: usize,
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Upsert case records in source order, one at a time.
///
/// Each record is validated against the `profiles` collection immediately
/// before its own write, so a master-listing change mid-batch is observed
/// rather than worked around with a stale bulk fetch. A record whose agent
/// is unknown is skipped with a warning; a record whose write fails is
/// logged and counted, and the batch continues. Re-running against an
/// unchanged remote is a no-op: every write is a full overwrite keyed by
/// `policy_number`.
pub fn sync_cases(store: &dyn RemoteStore, records: &[CaseRecord]) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for record in records {
        summary.processed += 1;

        match store.agent_exists(&record.agent_id) {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    agent_code = %record.agent_id,
                    policy_number = %record.policy_number,
                    "skipping: agent not found in master listing"
                );
                summary.skipped += 1;
                continue;
            }
            Err(err) => {
                error!(
                    agent_code = %record.agent_id,
                    policy_number = %record.policy_number,
                    error = %err,
                    "agent lookup failed"
                );
                summary.failed += 1;
                continue;
            }
        }

        match store.upsert_case(record) {
            Ok(()) => summary.synced += 1,
            Err(err) => {
                error!(
                    policy_number = %record.policy_number,
                    error = %err,
                    "error syncing policy"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Upsert agent profiles in source order. The master listing is the
/// authority for `profiles`, so there is no validation step, only the
/// keyed overwrite.
pub fn sync_profiles(store: &dyn RemoteStore, profiles: &[AgentProfile]) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for profile in profiles {
        summary.processed += 1;
        match store.upsert_profile(profile) {
            Ok(()) => summary.synced += 1,
            Err(err) => {
                error!(
                    agent_code = %profile.agent_code,
                    error = %err,
                    "error importing agent"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
