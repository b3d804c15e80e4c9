//! Remote service tier.
//!
//! The hosted backend speaks the PostgREST convention: each table is a
//! REST resource returning a JSON array of row objects. One bounded GET
//! per load; every failure is an ordinary `Err` that the loader absorbs
//! as "service unavailable"; callers never see it.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::config::ServiceConfig;
use crate::schema::RawTable;

/// Build the blocking HTTP client shared by all remote calls, with the
/// configured client-side timeout.
pub fn build_client(config: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .context("building HTTP client")
}

/// Fetch up to `config.fetch_limit` rows of `table`.
///
/// Row-object keys become headers; values are stringified for the
/// normalizer. Nulls become empty cells.
pub fn fetch_rows(client: &Client, config: &ServiceConfig, table: &str) -> Result<RawTable> {
    let url = rows_url(&config.endpoint, table, config.fetch_limit)?;
    debug!(%url, "querying remote table");

    let rows: Vec<Map<String, Value>> = client
        .get(url)
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .send()
        .with_context(|| format!("requesting table `{table}`"))?
        .error_for_status()
        .with_context(|| format!("querying table `{table}`"))?
        .json()
        .with_context(|| format!("decoding rows of table `{table}`"))?;

    Ok(raw_table_from_rows(rows))
}

fn rows_url(endpoint: &str, table: &str, limit: usize) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .with_context(|| format!("invalid service endpoint `{endpoint}`"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("service endpoint `{endpoint}` cannot be a base URL"))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("limit", &limit.to_string());
    Ok(url)
}

fn raw_table_from_rows(rows: Vec<Map<String, Value>>) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|header| match row.get(header) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();

    RawTable { headers, rows }
}
