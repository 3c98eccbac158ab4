use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;

use crate::remote::RemoteStore;
use crate::transform::{AgentProfile, CaseRecord};

/// In-memory stand-in for the remote store, keyed exactly like the real
/// collections. Supports per-key write-failure injection so tests can
/// exercise the batch's failure isolation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, AgentProfile>,
    cases: HashMap<String, CaseRecord>,
    failing_cases: HashSet<String>,
    failing_profiles: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a minimal profile so the given agent code passes validation.
    pub fn seed_agent(&self, agent_code: &str) {
        let profile = AgentProfile {
            agent_code: agent_code.to_string(),
            full_name: "Unknown Agent".to_string(),
            email: None,
            rank: String::new(),
        };
        self.inner
            .lock()
            .unwrap()
            .profiles
            .insert(agent_code.to_string(), profile);
    }

    /// Make every upsert for this policy number fail.
    pub fn fail_case_writes(&self, policy_number: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_cases
            .insert(policy_number.to_string());
    }

    /// Make every upsert for this agent code fail.
    pub fn fail_profile_writes(&self, agent_code: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_profiles
            .insert(agent_code.to_string());
    }

    pub fn case(&self, policy_number: &str) -> Option<CaseRecord> {
        self.inner.lock().unwrap().cases.get(policy_number).cloned()
    }

    pub fn profile(&self, agent_code: &str) -> Option<AgentProfile> {
        self.inner.lock().unwrap().profiles.get(agent_code).cloned()
    }

    /// Snapshot of all cases, ordered by policy number.
    pub fn cases(&self) -> Vec<CaseRecord> {
        let inner = self.inner.lock().unwrap();
        let mut cases: Vec<CaseRecord> = inner.cases.values().cloned().collect();
        cases.sort_by(|a, b| a.policy_number.cmp(&b.policy_number));
        cases
    }

    /// Snapshot of all profiles, ordered by agent code.
    pub fn profiles(&self) -> Vec<AgentProfile> {
        let inner = self.inner.lock().unwrap();
        let mut profiles: Vec<AgentProfile> = inner.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.agent_code.cmp(&b.agent_code));
        profiles
    }
}

impl RemoteStore for MemoryStore {
    fn agent_exists(&self, agent_code: &str) -> Result<bool> {
        Ok(self.inner.lock().unwrap().profiles.contains_key(agent_code))
    }

    fn upsert_profile(&self, profile: &AgentProfile) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_profiles.contains(&profile.agent_code) {
            anyhow::bail!("injected write failure for agent {}", profile.agent_code);
        }
        inner
            .profiles
            .insert(profile.agent_code.clone(), profile.clone());
        Ok(())
    }

    fn upsert_case(&self, record: &CaseRecord) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_cases.contains(&record.policy_number) {
            anyhow::bail!("injected write failure for policy {}", record.policy_number);
        }
        inner
            .cases
            .insert(record.policy_number.clone(), record.clone());
        Ok(())
    }
}
