//! Environment-provided configuration.
//!
//! Everything here is optional with documented defaults: a missing
//! service endpoint or key is not an error, it just means the loader
//! skips the remote tier and goes straight to the spreadsheet fallback.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::schema::Dataset;

/// Default cap on rows fetched from the remote service per table.
pub const DEFAULT_FETCH_LIMIT: usize = 10_000;

/// Default client-side timeout for remote calls. On timeout the loader
/// proceeds directly to the spreadsheet tier.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the hosted table service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub api_key: String,
    pub fetch_limit: usize,
    pub timeout: Duration,
    inflation_table: Option<String>,
    policy_rate_table: Option<String>,
    exchange_rate_table: Option<String>,
}

impl ServiceConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            inflation_table: None,
            policy_rate_table: None,
            exchange_rate_table: None,
        }
    }

    /// Read the service configuration from the environment, after a
    /// best-effort `.env` load. Returns `None` when the endpoint or key
    /// is absent, which silently disables the remote tier.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();

        let endpoint = env_trimmed(&["PDS_SERVICE_URL", "SUPABASE_URL"])?;
        let api_key = env_trimmed(&["PDS_SERVICE_KEY", "SUPABASE_ANON_KEY"])?;

        let fetch_limit = env_trimmed(&["PDS_FETCH_LIMIT", "SUPABASE_FETCH_LIMIT"])
            .and_then(|raw| raw.parse::<usize>().ok())
            .map(|n| n.max(1))
            .unwrap_or(DEFAULT_FETCH_LIMIT);

        let timeout = env_trimmed(&["PDS_FETCH_TIMEOUT_SECS"])
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Some(Self {
            endpoint,
            api_key,
            fetch_limit,
            timeout,
            inflation_table: env_trimmed(&["PDS_INFLATION_TABLE", "SUPABASE_INFLASI_TABLE"]),
            policy_rate_table: env_trimmed(&["PDS_POLICY_RATE_TABLE", "SUPABASE_BI_TABLE"]),
            exchange_rate_table: env_trimmed(&["PDS_EXCHANGE_RATE_TABLE", "SUPABASE_JISDOR_TABLE"]),
        })
    }

    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Remote table name for `dataset`: the per-dataset override when
    /// configured, else the dataset's default.
    pub fn table_for(&self, dataset: Dataset) -> &str {
        let configured = match dataset {
            Dataset::Inflation => &self.inflation_table,
            Dataset::PolicyRate => &self.policy_rate_table,
            Dataset::ExchangeRate => &self.exchange_rate_table,
        };
        configured.as_deref().unwrap_or(dataset.remote_table())
    }
}

/// Directory holding the spreadsheet fallback files: `PDS_DATA_DIR` when
/// set, else the first existing of `data/` and `dataset/`, else `data/`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = env_trimmed(&["PDS_DATA_DIR"]) {
        return PathBuf::from(dir);
    }
    for candidate in ["data", "dataset"] {
        let path = PathBuf::from(candidate);
        if path.is_dir() {
            return path;
        }
    }
    PathBuf::from("data")
}

/// First non-empty value among `keys`, trimmed.
fn env_trimmed(keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Ok(value) = env::var(key) {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_overrides_fall_back_to_defaults() {
        let config = ServiceConfig::new("https://example.supabase.co", "anon");
        assert_eq!(config.table_for(Dataset::Inflation), "inflasi");
        assert_eq!(config.table_for(Dataset::PolicyRate), "bi_7day_rr");
        assert_eq!(config.table_for(Dataset::ExchangeRate), "kurs_jisdor");
    }

    // Single test mutating the environment so parallel tests never race
    // on the same variables.
    #[test]
    fn from_env_requires_endpoint_and_key() {
        env::remove_var("PDS_SERVICE_URL");
        env::remove_var("SUPABASE_URL");
        env::remove_var("PDS_SERVICE_KEY");
        env::remove_var("SUPABASE_ANON_KEY");
        assert!(ServiceConfig::from_env().is_none());

        env::set_var("SUPABASE_URL", "https://example.supabase.co");
        assert!(ServiceConfig::from_env().is_none());

        env::set_var("SUPABASE_ANON_KEY", "anon-key");
        env::set_var("SUPABASE_FETCH_LIMIT", "250");
        env::set_var("SUPABASE_BI_TABLE", "bi_rates_v2");
        let config = ServiceConfig::from_env().expect("endpoint and key are set");
        assert_eq!(config.endpoint, "https://example.supabase.co");
        assert_eq!(config.fetch_limit, 250);
        assert_eq!(config.table_for(Dataset::PolicyRate), "bi_rates_v2");

        // Blank values count as absent.
        env::set_var("SUPABASE_ANON_KEY", "   ");
        assert!(ServiceConfig::from_env().is_none());

        env::remove_var("SUPABASE_URL");
        env::remove_var("SUPABASE_ANON_KEY");
        env::remove_var("SUPABASE_FETCH_LIMIT");
        env::remove_var("SUPABASE_BI_TABLE");
    }
}
