//! Canonical data model and normalization.
//!
//! Both source tiers produce a [`RawTable`]: headers plus string cells,
//! exactly what the file or service claims. Normalization resolves the
//! headers against the synonym table, coerces each cell, and emits
//! canonical records. Rows with non-coercible required fields are
//! dropped individually; a source missing a required column is unusable
//! as a whole and the loader moves on to the next tier.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod coerce;
pub mod province;
pub mod synonyms;

pub use synonyms::SynonymTable;

/// The logical datasets the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Inflation,
    PolicyRate,
    ExchangeRate,
}

impl Dataset {
    /// Parse a dataset identifier (canonical id or common alias).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "inflation" | "inflasi" => Some(Self::Inflation),
            "policy-rate" | "bi-7day-rr" | "bi_7day_rr" => Some(Self::PolicyRate),
            "exchange-rate" | "kurs" | "kurs-jisdor" | "jisdor" => Some(Self::ExchangeRate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inflation => "inflation",
            Self::PolicyRate => "policy-rate",
            Self::ExchangeRate => "exchange-rate",
        }
    }

    /// Default remote table name, overridable via [`crate::ServiceConfig`].
    pub fn remote_table(self) -> &'static str {
        match self {
            Self::Inflation => "inflasi",
            Self::PolicyRate => "bi_7day_rr",
            Self::ExchangeRate => "kurs_jisdor",
        }
    }

    /// Synonym-table key of the dataset's value column.
    pub fn value_column(self) -> &'static str {
        match self {
            Self::Inflation => "inflation",
            Self::PolicyRate => "rate",
            Self::ExchangeRate => "kurs",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One monthly inflation observation. Unique per (province, year, month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationRecord {
    pub province: String,
    pub year: i32,
    /// 1–12.
    pub month: u32,
    pub inflation_percent: f64,
}

/// One dated observation of a rate series. Unique per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub value: f64,
}

/// Headers plus string cells, straight from a source. The only
/// stringly-typed shape in the crate; it never escapes the loader.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A canonical table, ordered deterministically: inflation by
/// (year, month, province), rates by date.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Inflation(Vec<InflationRecord>),
    Rates(Vec<RateRecord>),
}

impl Table {
    pub fn empty(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Inflation => Self::Inflation(Vec::new()),
            Dataset::PolicyRate | Dataset::ExchangeRate => Self::Rates(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Inflation(records) => records.len(),
            Self::Rates(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display column names exposed to the presentation layer.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Self::Inflation(_) => &["Province", "Year", "Month", "Inflation(%)"],
            Self::Rates(_) => &["Date", "Value"],
        }
    }

    pub fn as_inflation(&self) -> Option<&[InflationRecord]> {
        match self {
            Self::Inflation(records) => Some(records),
            Self::Rates(_) => None,
        }
    }

    pub fn as_rates(&self) -> Option<&[RateRecord]> {
        match self {
            Self::Rates(records) => Some(records),
            Self::Inflation(_) => None,
        }
    }

    /// Keep only observations whose year falls in `years`.
    pub fn retain_years(&mut self, years: &RangeInclusive<i32>) {
        match self {
            Self::Inflation(records) => records.retain(|r| years.contains(&r.year)),
            Self::Rates(records) => records.retain(|r| years.contains(&r.date.year())),
        }
    }
}

/// Normalize a raw source table into canonical records.
///
/// Returns `None` when a required column cannot be resolved; the source
/// is unusable and the caller falls through to the next tier.
pub fn normalize(dataset: Dataset, raw: &RawTable, synonyms: &SynonymTable) -> Option<Table> {
    match dataset {
        Dataset::Inflation => normalize_inflation(raw, synonyms).map(Table::Inflation),
        Dataset::PolicyRate | Dataset::ExchangeRate => {
            normalize_rates(raw, synonyms, dataset.value_column()).map(Table::Rates)
        }
    }
}

pub fn normalize_inflation(
    raw: &RawTable,
    synonyms: &SynonymTable,
) -> Option<Vec<InflationRecord>> {
    let province = synonyms.position("province", &raw.headers)?;
    let year = synonyms.position("year", &raw.headers)?;
    let month = synonyms.position("month", &raw.headers)?;
    let value = synonyms.position("inflation", &raw.headers)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(record) = inflation_record(row, province, year, month, value) else {
            continue;
        };
        records.push(record);
    }
    Some(records)
}

fn inflation_record(
    row: &[String],
    province: usize,
    year: usize,
    month: usize,
    value: usize,
) -> Option<InflationRecord> {
    let name = row.get(province)?.trim();
    if name.is_empty() {
        return None;
    }
    Some(InflationRecord {
        province: province::canonical(name),
        year: coerce::parse_year(row.get(year)?)?,
        month: coerce::parse_month(row.get(month)?)?,
        inflation_percent: coerce::parse_number(row.get(value)?)?,
    })
}

pub fn normalize_rates(
    raw: &RawTable,
    synonyms: &SynonymTable,
    value_column: &str,
) -> Option<Vec<RateRecord>> {
    let date = synonyms.position("date", &raw.headers)?;
    let value = synonyms.position(value_column, &raw.headers)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let Some(record) = rate_record(row, date, value) else {
            continue;
        };
        records.push(record);
    }
    Some(records)
}

fn rate_record(row: &[String], date: usize, value: usize) -> Option<RateRecord> {
    Some(RateRecord {
        date: coerce::parse_date(row.get(date)?)?,
        value: coerce::parse_number(row.get(value)?)?,
    })
}

/// Collapse duplicate (province, year, month) keys to the mean value.
/// Output comes back in canonical order.
pub fn collapse_mean(records: Vec<InflationRecord>) -> Vec<InflationRecord> {
    let mut groups: BTreeMap<(i32, u32, String), (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.year, record.month, record.province))
            .or_insert((0.0, 0));
        entry.0 += record.inflation_percent;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((year, month, province), (sum, n))| InflationRecord {
            province,
            year,
            month,
            inflation_percent: sum / n as f64,
        })
        .collect()
}

/// Keep the last observation per (province, year, month), in canonical
/// order. Used when merging several spreadsheet files: later files win.
pub fn dedupe_keep_last(records: Vec<InflationRecord>) -> Vec<InflationRecord> {
    let mut map: BTreeMap<(i32, u32, String), f64> = BTreeMap::new();
    for record in records {
        map.insert(
            (record.year, record.month, record.province),
            record.inflation_percent,
        );
    }
    map.into_iter()
        .map(|((year, month, province), inflation_percent)| InflationRecord {
            province,
            year,
            month,
            inflation_percent,
        })
        .collect()
}

/// Keep the last observation per date, sorted by date.
pub fn dedupe_rates(records: Vec<RateRecord>) -> Vec<RateRecord> {
    let mut map: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        map.insert(record.date, record.value);
    }
    map.into_iter()
        .map(|(date, value)| RateRecord { date, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn normalizes_indonesian_headers() {
        let raw = raw(
            &["Provinsi", "Tahun", "Bulan", "Inflasi (%)"],
            &[&["Jakarta", "2024", "1", "3.2"]],
        );
        let table = normalize(Dataset::Inflation, &raw, &SynonymTable::default()).unwrap();
        let records = table.as_inflation().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].province, "Jakarta");
        assert_eq!(records[0].year, 2024);
        assert_eq!(records[0].month, 1);
        assert_eq!(records[0].inflation_percent, 3.2);
    }

    #[test]
    fn non_numeric_rows_are_excluded_not_fatal() {
        let raw = raw(
            &["province", "year", "month", "inflation_percent"],
            &[
                &["Jakarta", "2024", "1", "3.2"],
                &["Bali", "2024", "1", "-"],
            ],
        );
        let table = normalize(Dataset::Inflation, &raw, &SynonymTable::default()).unwrap();
        let records = table.as_inflation().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].province, "Jakarta");
    }

    #[test]
    fn missing_required_column_makes_source_unusable() {
        let raw = raw(&["Provinsi", "Tahun", "Bulan"], &[&["Jakarta", "2024", "1"]]);
        assert!(normalize(Dataset::Inflation, &raw, &SynonymTable::default()).is_none());
    }

    #[test]
    fn unrecognized_columns_are_dropped() {
        let raw = raw(
            &["id", "provinsi", "tahun", "bulan", "inflasi", "created_at"],
            &[&["7", "Bali", "2025", "2", "2,9", "2025-03-01"]],
        );
        let table = normalize(Dataset::Inflation, &raw, &SynonymTable::default()).unwrap();
        let records = table.as_inflation().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].inflation_percent, 2.9);
    }

    #[test]
    fn rate_normalization_resolves_value_synonyms() {
        let raw = raw(
            &["tanggal", "BI-7Day-RR"],
            &[
                &["2024-01-05", "6.00"],
                &["2024-02-05", "not a number"],
            ],
        );
        let table = normalize(Dataset::PolicyRate, &raw, &SynonymTable::default()).unwrap();
        let records = table.as_rates().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(records[0].value, 6.0);
    }

    #[test]
    fn collapse_mean_merges_duplicate_keys() {
        let records = vec![
            InflationRecord {
                province: "Bali".into(),
                year: 2024,
                month: 1,
                inflation_percent: 2.0,
            },
            InflationRecord {
                province: "Bali".into(),
                year: 2024,
                month: 1,
                inflation_percent: 4.0,
            },
            InflationRecord {
                province: "Aceh".into(),
                year: 2024,
                month: 1,
                inflation_percent: 1.0,
            },
        ];
        let collapsed = collapse_mean(records);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].province, "Aceh");
        assert_eq!(collapsed[1].province, "Bali");
        assert_eq!(collapsed[1].inflation_percent, 3.0);
    }

    #[test]
    fn keep_last_prefers_later_files() {
        let records = vec![
            InflationRecord {
                province: "Jambi".into(),
                year: 2024,
                month: 6,
                inflation_percent: 2.5,
            },
            InflationRecord {
                province: "Jambi".into(),
                year: 2024,
                month: 6,
                inflation_percent: 2.7,
            },
        ];
        let deduped = dedupe_keep_last(records);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].inflation_percent, 2.7);
    }

    #[test]
    fn retain_years_filters_both_shapes() {
        let mut inflation = Table::Inflation(vec![
            InflationRecord {
                province: "Bali".into(),
                year: 2023,
                month: 12,
                inflation_percent: 2.0,
            },
            InflationRecord {
                province: "Bali".into(),
                year: 2024,
                month: 1,
                inflation_percent: 2.1,
            },
        ]);
        inflation.retain_years(&(2024..=2024));
        assert_eq!(inflation.len(), 1);

        let mut rates = Table::Rates(vec![
            RateRecord {
                date: NaiveDate::from_ymd_opt(2023, 12, 20).unwrap(),
                value: 6.0,
            },
            RateRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
                value: 6.25,
            },
        ]);
        rates.retain_years(&(2024..=2025));
        assert_eq!(rates.len(), 1);
    }

    #[test]
    fn dataset_identifiers_round_trip() {
        for dataset in [
            Dataset::Inflation,
            Dataset::PolicyRate,
            Dataset::ExchangeRate,
        ] {
            assert_eq!(Dataset::parse(dataset.as_str()), Some(dataset));
        }
        assert_eq!(Dataset::parse("kurs"), Some(Dataset::ExchangeRate));
        assert_eq!(Dataset::parse("unknown"), None);
    }
}
