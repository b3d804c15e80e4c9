//! National periode format, `data_inflasi.csv`.
//!
//! The national series ships as `No, Periode, Data Inflasi` where the
//! periode cell reads "Desember 2025" and the header row is not
//! necessarily first. Rows become records for the synthetic province
//! "Nasional".

use tracing::debug;

use crate::schema::{coerce, InflationRecord, RawTable};

/// Province name used for the national aggregate series.
pub const NATIONAL: &str = "Nasional";

/// Try to parse the national periode layout out of `raw`. Returns
/// `None` when no periode/inflasi header pair can be found, so callers
/// can try other layouts.
pub fn read_national(raw: &RawTable) -> Option<Vec<InflationRecord>> {
    // The header may be the nominal header row or buried below junk
    // rows that ended up parsed as data.
    let all_rows = std::iter::once(&raw.headers).chain(raw.rows.iter());
    let (header_offset, header) = all_rows.enumerate().find(|(_, row)| {
        let lowered: Vec<String> = row.iter().map(|c| c.trim().to_lowercase()).collect();
        lowered.iter().any(|c| c == "periode") && lowered.iter().any(|c| c.contains("inflasi"))
    })?;

    let lowered: Vec<String> = header.iter().map(|c| c.trim().to_lowercase()).collect();
    let periode_col = lowered.iter().position(|c| c == "periode")?;
    let inflasi_col = lowered.iter().position(|c| c.contains("inflasi"))?;

    let mut records = Vec::new();
    for row in raw.rows.iter().skip(header_offset) {
        let Some((month, year)) = row.get(periode_col).and_then(|c| coerce::parse_periode(c))
        else {
            continue;
        };
        let Some(value) = row.get(inflasi_col).and_then(|c| coerce::parse_number(c)) else {
            continue;
        };
        records.push(InflationRecord {
            province: NATIONAL.to_string(),
            year,
            month,
            inflation_percent: value,
        });
    }

    debug!(rows = records.len(), "parsed national periode layout");
    Some(records)
}
