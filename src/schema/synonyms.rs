//! Header-synonym resolution.
//!
//! Source tables spell their columns in several languages and casings
//! ("Provinsi"/"province", "Tanggal"/"datetime", "Inflasi (%)"). The
//! synonym table maps each canonical column to every recognized
//! spelling; matching is case-insensitive after trimming. The defaults
//! cover everything the dashboard has seen in the wild and can be
//! extended at runtime from a YAML file.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Built-in spellings per canonical column.
static DEFAULTS: &[(&str, &[&str])] = &[
    ("province", &["provinsi"]),
    ("year", &["tahun"]),
    ("month", &["bulan"]),
    (
        "inflation",
        &[
            "inflasi",
            "inflasi_persen",
            "inflasi_percent",
            "inflation_percent",
            "inflation_%",
            "inflasi(%)",
            "inflasi (%)",
            "inflasi %",
            "inflation (%)",
        ],
    ),
    ("date", &["tanggal", "datetime"]),
    (
        "rate",
        &[
            "bi_7day_rr",
            "bi7dayrr",
            "bi_rate",
            "bi-7day-rr",
            "bi-7day-rr(%)",
            "bi-7day-rr %",
        ],
    ),
    ("kurs", &["rate", "jisdor", "kurs_jisdor"]),
];

/// Mapping from canonical column names to recognized header spellings.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    map: BTreeMap<String, Vec<String>>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let map = DEFAULTS
            .iter()
            .map(|(canonical, spellings)| {
                (
                    canonical.to_string(),
                    spellings.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self { map }
    }
}

impl SynonymTable {
    /// Defaults plus the overrides named by `PDS_SYNONYMS_FILE`, if any.
    /// An unreadable override file is logged and ignored.
    pub fn from_env() -> Self {
        let mut table = Self::default();
        if let Ok(path) = std::env::var("PDS_SYNONYMS_FILE") {
            let path = path.trim();
            if !path.is_empty() {
                if let Err(err) = table.merge_file(Path::new(path)) {
                    warn!(path, error = %err, "ignoring synonym override file");
                }
            }
        }
        table
    }

    /// Merge a YAML override file mapping canonical names to extra
    /// spellings, e.g. `inflation: ["laju inflasi"]`.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("opening synonym overrides {}", path.display()))?;
        let overrides: BTreeMap<String, Vec<String>> = serde_yaml::from_reader(file)
            .with_context(|| format!("parsing synonym overrides {}", path.display()))?;
        self.merge(overrides);
        Ok(())
    }

    /// Append extra spellings; new canonical names are accepted too.
    pub fn merge(&mut self, overrides: BTreeMap<String, Vec<String>>) {
        for (canonical, spellings) in overrides {
            let entry = self.map.entry(canonical.trim().to_lowercase()).or_default();
            for spelling in spellings {
                let spelling = spelling.trim().to_lowercase();
                if !spelling.is_empty() && !entry.contains(&spelling) {
                    entry.push(spelling);
                }
            }
        }
    }

    /// Index of the header matching `canonical` (the canonical name
    /// itself always counts as a spelling).
    pub fn position(&self, canonical: &str, headers: &[String]) -> Option<usize> {
        let spellings = self.map.get(canonical);
        headers.iter().position(|header| {
            let header = header.trim().to_lowercase();
            header == canonical
                || spellings.map_or(false, |known| known.iter().any(|s| *s == header))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn every_default_spelling_resolves() {
        let table = SynonymTable::default();
        for (canonical, spellings) in DEFAULTS {
            for spelling in spellings.iter().chain(std::iter::once(canonical)) {
                // Mixed casing and padding must not matter.
                let decorated = format!("  {}  ", spelling.to_uppercase());
                let headers = headers(&["ignored", &decorated]);
                assert_eq!(
                    table.position(canonical, &headers),
                    Some(1),
                    "`{spelling}` should resolve to `{canonical}`"
                );
            }
        }
    }

    #[test]
    fn unknown_headers_do_not_resolve() {
        let table = SynonymTable::default();
        assert_eq!(table.position("province", &headers(&["kota", "negara"])), None);
    }

    #[test]
    fn yaml_overrides_extend_the_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "inflation: [\"laju inflasi\"]\nregion: [\"wilayah\"]").unwrap();

        let mut table = SynonymTable::default();
        table.merge_file(file.path()).unwrap();

        assert_eq!(
            table.position("inflation", &headers(&["Laju Inflasi"])),
            Some(0)
        );
        assert_eq!(table.position("region", &headers(&["WILAYAH"])), Some(0));
        // Defaults survive the merge.
        assert_eq!(table.position("inflation", &headers(&["Inflasi (%)"])), Some(0));
    }
}
