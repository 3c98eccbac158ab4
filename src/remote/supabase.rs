use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::remote::RemoteStore;
use crate::transform::{AgentProfile, CaseRecord};

const PROFILES_TABLE: &str = "profiles";
const CASES_TABLE: &str = "cases";

/// PostgREST client for the Supabase project. Every call is a blocking
/// request; the batch is sequential by design, so a slow remote only slows
/// the run.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
}

impl SupabaseStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .context("service key is not a valid header value")?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .context("service key is not a valid header value")?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Insert-or-overwrite one row, resolving key conflicts on
    /// `conflict_key`. All columns are sent, so a conflict replaces the
    /// full row.
    fn upsert<T: Serialize>(&self, table: &str, conflict_key: &str, payload: &T) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(payload)
            .send()
            .with_context(|| format!("upsert request to {table} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("upsert to {table} rejected: {status} {body}");
        }
        debug!(table, conflict_key, "upserted row");
        Ok(())
    }
}

impl RemoteStore for SupabaseStore {
    fn agent_exists(&self, agent_code: &str) -> Result<bool> {
        let filter = format!("eq.{agent_code}");
        let rows: Vec<serde_json::Value> = self
            .client
            .get(self.table_url(PROFILES_TABLE))
            .query(&[("select", "agent_code"), ("agent_code", filter.as_str())])
            .send()
            .context("profile lookup request failed")?
            .error_for_status()
            .context("profile lookup rejected")?
            .json()
            .context("profile lookup returned malformed JSON")?;
        Ok(!rows.is_empty())
    }

    fn upsert_profile(&self, profile: &AgentProfile) -> Result<()> {
        self.upsert(PROFILES_TABLE, "agent_code", profile)
    }

    fn upsert_case(&self, record: &CaseRecord) -> Result<()> {
        self.upsert(CASES_TABLE, "policy_number", record)
    }
}
