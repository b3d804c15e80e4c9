//! Wide yearly province matrix, `Inflasi_Tahunan_<year>.csv`.
//!
//! BPS publishes one file per year: a few title rows, then a header row
//! of month names (Januari..Desember), then one row per province with
//! the first column holding the name, often prefixed `PROV `. The year
//! lives only in the filename.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

use crate::schema::{coerce, province, InflationRecord};

/// Parse one yearly matrix file into canonical records.
pub fn read_year_matrix(path: &Path) -> Result<Vec<InflationRecord>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let year = coerce::year_from_filename(&name)
        .ok_or_else(|| anyhow!("no year in filename `{name}`"))?;

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

    // Hunt for the month-name header row; title rows precede it.
    let header_idx = records
        .iter()
        .position(|row| {
            let lowered: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
            lowered.iter().any(|c| c == "januari") && lowered.iter().any(|c| c == "desember")
        })
        .ok_or_else(|| anyhow!("{} has no month header row", path.display()))?;

    let month_cols: Vec<(u32, usize)> = records[header_idx]
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| coerce::month_from_name(cell).map(|month| (month, idx)))
        .collect();

    let mut out = Vec::new();
    for row in &records[header_idx + 1..] {
        let Some(raw_name) = row.first() else { continue };
        let raw_name = raw_name.trim();
        if raw_name.is_empty() {
            continue;
        }
        let name = strip_prov_prefix(raw_name);

        for &(month, col) in &month_cols {
            let Some(cell) = row.get(col) else { continue };
            let Some(value) = coerce::parse_number(cell) else {
                continue;
            };
            out.push(InflationRecord {
                province: province::canonical(name),
                year,
                month,
                inflation_percent: value,
            });
        }
    }

    debug!(path = %path.display(), year, rows = out.len(), "parsed yearly matrix");
    Ok(out)
}

fn strip_prov_prefix(name: &str) -> &str {
    for prefix in ["PROV ", "Prov ", "prov "] {
        if let Some(stripped) = name.strip_prefix(prefix) {
            return stripped.trim();
        }
    }
    name
}
