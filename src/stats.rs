//! Descriptive statistics for the dashboard's summary tiles.

use crate::schema::InflationRecord;

/// Summary metrics over an inflation series, rounded for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub highest: f64,
    pub lowest: f64,
    pub std_dev: f64,
}

impl Default for Summary {
    // All-zero summary for an empty selection; the UI renders it as-is.
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            highest: 0.0,
            lowest: 0.0,
            std_dev: 0.0,
        }
    }
}

/// Summarize a value series: mean, extremes, sample standard deviation,
/// all rounded to 2 decimals.
pub fn summarize(values: &[f64]) -> Summary {
    let n = values.len();
    if n == 0 {
        return Summary::default();
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let highest = values.iter().cloned().fold(f64::MIN, f64::max);
    let lowest = values.iter().cloned().fold(f64::MAX, f64::min);
    let std_dev = if n > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    Summary {
        count: n,
        mean: round2(mean),
        highest: round2(highest),
        lowest: round2(lowest),
        std_dev: round2(std_dev),
    }
}

/// Summarize the inflation column of a record slice.
pub fn summarize_inflation(records: &[InflationRecord]) -> Summary {
    let values: Vec<f64> = records.iter().map(|r| r.inflation_percent).collect();
    summarize(&values)
}

/// Most recent year present in the series; drives default filters.
pub fn latest_year(records: &[InflationRecord]) -> Option<i32> {
    records.iter().map(|r| r.year).max()
}

/// Most recent month observed within `year`.
pub fn latest_month_in_year(records: &[InflationRecord], year: i32) -> Option<u32> {
    records
        .iter()
        .filter(|r| r.year == year)
        .map(|r| r.month)
        .max()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(province: &str, year: i32, month: u32, value: f64) -> InflationRecord {
        InflationRecord {
            province: province.to_string(),
            year,
            month,
            inflation_percent: value,
        }
    }

    #[test]
    fn summary_matches_hand_computation() {
        let summary = summarize(&[2.0, 3.0, 4.0]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.highest, 4.0);
        assert_eq!(summary.lowest, 2.0);
        // Sample std dev of [2, 3, 4] is exactly 1.
        assert_eq!(summary.std_dev, 1.0);
    }

    #[test]
    fn empty_series_summarizes_to_zeros() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn single_value_has_zero_spread() {
        let summary = summarize(&[2.57]);
        assert_eq!(summary.mean, 2.57);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn latest_period_helpers() {
        let records = vec![
            record("Bali", 2023, 12, 2.0),
            record("Bali", 2024, 3, 2.2),
            record("Aceh", 2024, 1, 2.1),
        ];
        assert_eq!(latest_year(&records), Some(2024));
        assert_eq!(latest_month_in_year(&records, 2024), Some(3));
        assert_eq!(latest_month_in_year(&records, 2023), Some(12));
        assert_eq!(latest_month_in_year(&records, 2020), None);
        assert_eq!(latest_year(&[]), None);
    }
}
