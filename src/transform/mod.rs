// src/transform/mod.rs
//
// Pure row-to-record mapping. Nothing in here touches the network or the
// filesystem; one raw row in, one canonical record out.

use serde::{Deserialize, Serialize};

use crate::extract::{Cell, Row};

/// Text artifact left behind when a missing value has been stringified
/// through a numeric type. Treated as absent wherever a field is nullable.
const NAN_SENTINEL: &str = "nan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Approved,
    Pending,
}

/// One submission case, keyed by `policy_number` in the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub client_name: String,
    pub policy_number: String,
    pub premium: f64,
    pub status: CaseStatus,
    pub submission_date: String,
    pub agent_id: String,
}

/// One agent from the master listing, keyed by `agent_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub rank: String,
}

/// Map one report row to a [`CaseRecord`].
///
/// Status is "approved" exactly when the raw status text contains the
/// substring `Inforce`. The match is case-sensitive: that is the data
/// convention the report follows today, and loosening it would silently
/// approve rows the upstream system does not.
pub fn case_record(row: &Row) -> CaseRecord {
    let status_text = row.text("PROPOSAL_STATUS");
    let status = if status_text.contains("Inforce") {
        CaseStatus::Approved
    } else {
        CaseStatus::Pending
    };

    CaseRecord {
        client_name: row.text("AGENT_NAME"),
        policy_number: row.text("PROPOSALNO").trim().to_string(),
        premium: row.get("AFYC").map(Cell::as_f64_or_zero).unwrap_or(0.0),
        status,
        submission_date: row.text("ENTRY_DATE"),
        agent_id: row.text("AGENT_CODE").trim().to_string(),
    }
}

/// Map one master-listing row to an [`AgentProfile`].
///
/// Returns `None` when the row has no agent code; such rows are filler in
/// the source sheet and carry nothing to sync.
pub fn agent_profile(row: &Row) -> Option<AgentProfile> {
    let agent_code = row.text("AGENT CODE").trim().to_string();
    if agent_code.is_empty() {
        return None;
    }

    let full_name = match row.get("NAME") {
        Some(cell) if !cell.is_absent() => cell.as_text(),
        _ => "Unknown Agent".to_string(),
    };

    let email = row
        .get("Email")
        .map(|cell| cell.as_text().to_lowercase().trim().to_string())
        .filter(|e| !e.is_empty() && e.as_str() != NAN_SENTINEL);

    Some(AgentProfile {
        agent_code,
        full_name,
        email,
        rank: row.text("RANK"),
    })
}
