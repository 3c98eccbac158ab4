// src/remote/mod.rs
//
// The persistence seam. The pipeline only ever talks to `RemoteStore`; the
// concrete Supabase client is constructed by the binaries and injected, so
// tests run against the in-memory implementation.

pub mod memory;
pub mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use anyhow::Result;

use crate::transform::{AgentProfile, CaseRecord};

/// Two keyed collections: `profiles` keyed by `agent_code` and `cases`
/// keyed by `policy_number`. Upserts overwrite the full row on key
/// conflict; there is no delete.
pub trait RemoteStore {
    /// Point lookup used as the foreign-key check before a case is synced.
    fn agent_exists(&self, agent_code: &str) -> Result<bool>;

    fn upsert_profile(&self, profile: &AgentProfile) -> Result<()>;

    fn upsert_case(&self, record: &CaseRecord) -> Result<()>;
}
