//! Tiered data loading.
//!
//! One linear best-effort pipeline per request: remote service first
//! (when configured), then the local spreadsheets, then an explicit
//! `Unavailable` result. A tier counts as successful only when it
//! yields at least one canonical row; every failure is absorbed and
//! logged, never propagated. There is no same-tier retry.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{self, ServiceConfig};
use crate::fetch;
use crate::schema::{self, Dataset, SynonymTable, Table};
use crate::sheet;

mod memo;

pub use memo::DEFAULT_TTL;
use memo::{Memo, MemoKey};

/// Why a tier produced nothing. Only ever logged; callers see
/// [`Source::Unavailable`] instead.
#[derive(Debug, Error)]
enum TierError {
    #[error("service not configured")]
    NotConfigured,
    #[error("service unavailable: {0:#}")]
    Service(anyhow::Error),
    #[error("no spreadsheet found under {}", .0.display())]
    NoFile(PathBuf),
    #[error("columns do not match any recognized schema")]
    UnrecognizedSchema,
    #[error("source contained no usable rows")]
    Empty,
}

impl TierError {
    /// Absent configuration and absent files are expected states, not
    /// failures worth a warning.
    fn is_expected(&self) -> bool {
        matches!(self, Self::NotConfigured | Self::NoFile(_))
    }
}

/// Which tier produced the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Sheet,
    /// Every tier was exhausted; the table is empty.
    Unavailable,
}

/// A canonical table plus its provenance. Provenance is informational
/// only; the table always conforms to the canonical schema.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
    pub source: Source,
}

impl Loaded {
    pub fn is_unavailable(&self) -> bool {
        self.source == Source::Unavailable
    }
}

/// Filter hints and cache control for one load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Keep only observations within this year range.
    pub years: Option<RangeInclusive<i32>>,
    /// Bypass the memo and re-read the source tiers.
    pub refresh: bool,
}

/// The tiered loader. One instance per application, cheap to share by
/// reference: all state is the HTTP client and the read-through memo.
pub struct Loader {
    service: Option<ServiceConfig>,
    client: Option<Client>,
    data_dir: PathBuf,
    synonyms: SynonymTable,
    memo: Memo,
}

impl Loader {
    /// Build a loader from the environment: service credentials when
    /// present, data directory, synonym overrides.
    pub fn from_env() -> Self {
        let mut loader = Self::new(ServiceConfig::from_env(), config::data_dir());
        loader.synonyms = SynonymTable::from_env();
        loader
    }

    pub fn new(service: Option<ServiceConfig>, data_dir: impl Into<PathBuf>) -> Self {
        let client = service.as_ref().and_then(|config| {
            match fetch::build_client(config) {
                Ok(client) => Some(client),
                Err(err) => {
                    warn!(error = %err, "HTTP client unavailable; remote tier disabled");
                    None
                }
            }
        });
        Self {
            service,
            client,
            data_dir: data_dir.into(),
            synonyms: SynonymTable::default(),
            memo: Memo::new(DEFAULT_TTL),
        }
    }

    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn with_memo_ttl(mut self, ttl: Duration) -> Self {
        self.memo = Memo::new(ttl);
        self
    }

    /// Load `dataset`, consulting the memo unless `options.refresh`.
    ///
    /// Always returns: exhaustion of every tier yields an explicit
    /// empty table with [`Source::Unavailable`], never an error.
    pub fn load(&self, dataset: Dataset, options: &LoadOptions) -> Loaded {
        let key = MemoKey::new(dataset, options);
        if !options.refresh {
            if let Some(hit) = self.memo.get(&key) {
                debug!(%dataset, "memo hit");
                return hit;
            }
        }

        let loaded = self.load_uncached(dataset, options);
        self.memo.put(key, loaded.clone());
        loaded
    }

    /// Drop every memoized table; the next loads re-read the tiers.
    pub fn invalidate(&self) {
        self.memo.clear();
    }

    fn load_uncached(&self, dataset: Dataset, options: &LoadOptions) -> Loaded {
        match self.remote_tier(dataset) {
            Ok(table) => {
                info!(%dataset, rows = table.len(), "loaded from remote service");
                return self.finish(table, Source::Remote, options);
            }
            Err(err) if err.is_expected() => debug!(%dataset, "remote tier skipped: {err}"),
            Err(err) => warn!(%dataset, "remote tier failed: {err}"),
        }

        match self.sheet_tier(dataset) {
            Ok(table) => {
                info!(%dataset, rows = table.len(), "loaded from spreadsheet fallback");
                return self.finish(table, Source::Sheet, options);
            }
            Err(err) if err.is_expected() => debug!(%dataset, "sheet tier skipped: {err}"),
            Err(err) => warn!(%dataset, "sheet tier failed: {err}"),
        }

        info!(%dataset, "all tiers exhausted; data unavailable");
        Loaded {
            table: Table::empty(dataset),
            source: Source::Unavailable,
        }
    }

    fn finish(&self, mut table: Table, source: Source, options: &LoadOptions) -> Loaded {
        if let Some(years) = &options.years {
            table.retain_years(years);
        }
        Loaded { table, source }
    }

    fn remote_tier(&self, dataset: Dataset) -> Result<Table, TierError> {
        let (service, client) = match (&self.service, &self.client) {
            (Some(service), Some(client)) => (service, client),
            _ => return Err(TierError::NotConfigured),
        };

        let table_name = service.table_for(dataset);
        let raw = fetch::fetch_rows(client, service, table_name).map_err(TierError::Service)?;

        let table = schema::normalize(dataset, &raw, &self.synonyms)
            .ok_or(TierError::UnrecognizedSchema)?;
        // The hosted table may carry the same key under variant
        // spellings; collapse to the mean like the dashboard always has.
        let table = match table {
            Table::Inflation(records) => Table::Inflation(schema::collapse_mean(records)),
            Table::Rates(records) => Table::Rates(schema::dedupe_rates(records)),
        };
        if table.is_empty() {
            return Err(TierError::Empty);
        }
        Ok(table)
    }

    fn sheet_tier(&self, dataset: Dataset) -> Result<Table, TierError> {
        let paths = sheet::candidate_paths(&self.data_dir, dataset);
        if paths.is_empty() {
            return Err(TierError::NoFile(self.data_dir.clone()));
        }

        let table = match dataset {
            Dataset::Inflation => {
                let mut records = Vec::new();
                for path in &paths {
                    match sheet::read_inflation(path, &self.synonyms) {
                        Ok(mut parsed) => records.append(&mut parsed),
                        Err(err) => {
                            warn!(path = %path.display(), "skipping spreadsheet: {err:#}")
                        }
                    }
                }
                Table::Inflation(schema::dedupe_keep_last(records))
            }
            Dataset::PolicyRate | Dataset::ExchangeRate => {
                let mut records = Vec::new();
                for path in &paths {
                    match sheet::read_rates(path, dataset, &self.synonyms) {
                        Ok(mut parsed) => records.append(&mut parsed),
                        Err(err) => {
                            warn!(path = %path.display(), "skipping spreadsheet: {err:#}")
                        }
                    }
                }
                Table::Rates(schema::dedupe_rates(records))
            }
        };

        if table.is_empty() {
            return Err(TierError::Empty);
        }
        Ok(table)
    }
}
