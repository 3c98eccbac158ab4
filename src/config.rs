use anyhow::{Context, Result};

/// Connection settings for the remote store, read once at process start.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the Supabase project, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service-role key; the pipeline writes to tables the anon role cannot.
    pub service_key: String,
}

impl RemoteConfig {
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY is not set")?;
        Ok(Self {
            base_url,
            service_key,
        })
    }
}
