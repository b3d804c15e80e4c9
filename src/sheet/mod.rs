//! Local spreadsheet tier.
//!
//! Fallback files are CSV exports under the data directory, located by
//! a small set of known candidate names. Inflation data comes in three
//! layouts: the plain schema (`inflasi.csv`), the wide yearly province
//! matrix (`Inflasi_Tahunan_<year>.csv`), and the national periode
//! format (`data_inflasi.csv`). Rate series are plain two-column files.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use glob::glob;
use tracing::debug;

use crate::schema::{self, Dataset, InflationRecord, RateRecord, RawTable, SynonymTable};

pub mod periode;
pub mod wide;

/// Existing candidate files for `dataset`, in merge order: later files
/// win when records collide.
pub fn candidate_paths(data_dir: &Path, dataset: Dataset) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();

    match dataset {
        Dataset::Inflation => {
            for name in ["data_inflasi.csv", "inflasi.csv"] {
                paths.push(data_dir.join(name));
            }
            // Yearly matrix exports, oldest first so newer years win.
            let pattern = data_dir.join("Inflasi_Tahunan_*.csv");
            if let Ok(entries) = glob(&pattern.to_string_lossy()) {
                let mut yearly: Vec<PathBuf> = entries.filter_map(|e| e.ok()).collect();
                yearly.sort();
                paths.extend(yearly);
            }
        }
        Dataset::PolicyRate => {
            for name in ["bi_7day_rr.csv", "BI-7Day-RR.csv"] {
                paths.push(data_dir.join(name));
            }
        }
        Dataset::ExchangeRate => {
            for name in ["kurs_jisdor.csv", "Kurs_Jisdor.csv"] {
                paths.push(data_dir.join(name));
            }
        }
    }

    paths.retain(|p| p.is_file());
    paths.dedup();
    paths
}

/// Read a plain CSV into a [`RawTable`]: leading all-empty records are
/// skipped, the first real record is the header row.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        records.push(record.iter().map(|s| s.to_string()).collect());
    }

    let mut iter = records
        .into_iter()
        .skip_while(|row| row.iter().all(|cell| cell.trim().is_empty()));
    let headers = iter.next().unwrap_or_default();
    Ok(RawTable {
        headers,
        rows: iter.collect(),
    })
}

/// Parse one inflation spreadsheet, picking the layout by filename and
/// falling back to the periode format when the plain schema does not
/// resolve.
pub fn read_inflation(path: &Path, synonyms: &SynonymTable) -> Result<Vec<InflationRecord>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.contains("inflasi_tahunan") || name.contains("inflasi tahunan") {
        return wide::read_year_matrix(path);
    }

    let raw = read_table(path)?;
    if let Some(records) = schema::normalize_inflation(&raw, synonyms) {
        debug!(path = %path.display(), rows = records.len(), "parsed plain inflation sheet");
        return Ok(records);
    }
    if let Some(records) = periode::read_national(&raw) {
        debug!(path = %path.display(), rows = records.len(), "parsed national periode sheet");
        return Ok(records);
    }
    Err(anyhow!(
        "{} matches no recognized inflation layout",
        path.display()
    ))
}

/// Parse one rate spreadsheet. Files without recognizable headers fall
/// back to positional columns: date first, value second.
pub fn read_rates(
    path: &Path,
    dataset: Dataset,
    synonyms: &SynonymTable,
) -> Result<Vec<RateRecord>> {
    let raw = read_table(path)?;
    if let Some(records) = schema::normalize_rates(&raw, synonyms, dataset.value_column()) {
        return Ok(records);
    }

    if raw.headers.len() >= 2 {
        debug!(path = %path.display(), "headers unrecognized; assuming date,value columns");
        let records = raw
            .rows
            .iter()
            .filter_map(|row| {
                Some(RateRecord {
                    date: schema::coerce::parse_date(row.first()?)?,
                    value: schema::coerce::parse_number(row.get(1)?)?,
                })
            })
            .collect();
        return Ok(records);
    }

    Err(anyhow!(
        "{} matches no recognized rate layout",
        path.display()
    ))
}
