//! FX rates for the currency calculator.
//!
//! Same tiered shape as the data loader, one level smaller: a single
//! no-key HTTP call for USD-base rates, converted to an IDR-per-unit
//! map, with a static table as the offline fallback. Conversion goes
//! through IDR in both directions.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::warn;

use crate::stats::round2;

/// Currencies offered by the calculator, base first.
pub const DEFAULT_CURRENCIES: &[&str] = &[
    "IDR", "USD", "EUR", "JPY", "GBP", "AUD", "CNY", "SGD", "MYR", "THB",
];

/// Offline/demo fallback, IDR per 1 unit.
static IDR_FALLBACK: &[(&str, f64)] = &[
    ("IDR", 1.0),
    ("USD", 15_750.0),
    ("EUR", 17_000.0),
    ("JPY", 105.0),
    ("GBP", 20_000.0),
    ("AUD", 10_200.0),
    ("CNY", 2_200.0),
    ("SGD", 11_700.0),
    ("MYR", 3_550.0),
    ("THB", 450.0),
];

/// Public no-key endpoint returning `{ result, time_last_update_utc, rates }`
/// with base USD.
const RATES_ENDPOINT: &str = "https://open.er-api.com/v6/latest/USD";

#[derive(Debug, Deserialize)]
struct UsdBaseResponse {
    result: String,
    #[serde(default)]
    time_last_update_utc: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    Realtime,
    Fallback,
}

/// A point-in-time view of IDR conversion rates.
#[derive(Debug, Clone)]
pub struct RatesSnapshot {
    /// IDR per 1 unit of each currency.
    pub idr_per_unit: BTreeMap<String, f64>,
    pub source: RateSource,
    /// Upstream "last updated" stamp, when the live tier answered.
    pub as_of: Option<String>,
    pub fetched_at: DateTime<Utc>,
    /// Why the snapshot degraded, for display next to the rates.
    pub warnings: Vec<String>,
}

/// Fetch a snapshot for `currencies`, degrading to the static table on
/// any failure. Never errors.
pub fn snapshot(client: &Client, currencies: &[&str]) -> RatesSnapshot {
    snapshot_from(client, RATES_ENDPOINT, currencies)
}

fn snapshot_from(client: &Client, endpoint: &str, currencies: &[&str]) -> RatesSnapshot {
    let fetched_at = Utc::now();
    let mut warnings = Vec::new();

    match fetch_usd_base(client, endpoint) {
        Ok((rates, as_of)) => {
            let idr_per_unit = idr_rates_from_usd_base(&rates, currencies);
            if !idr_per_unit.is_empty() {
                return RatesSnapshot {
                    idr_per_unit,
                    source: RateSource::Realtime,
                    as_of,
                    fetched_at,
                    warnings,
                };
            }
            warnings.push("rates response is missing IDR/USD".to_string());
        }
        Err(err) => warnings.push(format!("realtime rates unavailable: {err:#}")),
    }

    for warning in &warnings {
        warn!("{warning}");
    }
    RatesSnapshot {
        idr_per_unit: fallback_rates(currencies),
        source: RateSource::Fallback,
        as_of: None,
        fetched_at,
        warnings,
    }
}

fn fetch_usd_base(client: &Client, endpoint: &str) -> Result<(HashMap<String, f64>, Option<String>)> {
    let payload: UsdBaseResponse = client
        .get(endpoint)
        .header("Accept", "application/json")
        .send()
        .context("requesting USD-base rates")?
        .error_for_status()
        .context("fetching USD-base rates")?
        .json()
        .context("decoding USD-base rates")?;

    if payload.result != "success" {
        bail!("rates endpoint returned result `{}`", payload.result);
    }
    let rates = payload
        .rates
        .into_iter()
        .map(|(code, value)| (code.to_uppercase(), value))
        .collect();
    Ok((rates, payload.time_last_update_utc))
}

/// Convert a USD-base rates map (1 USD = rates[CCY] CCY) into an
/// IDR-per-unit map: 1 CCY = (IDR per USD) / (CCY per USD).
/// Empty when IDR or USD is missing upstream.
pub fn idr_rates_from_usd_base(
    usd_base: &HashMap<String, f64>,
    currencies: &[&str],
) -> BTreeMap<String, f64> {
    let Some(&idr_per_usd) = usd_base.get("IDR") else {
        return BTreeMap::new();
    };
    if !usd_base.contains_key("USD") {
        return BTreeMap::new();
    }

    let mut out = BTreeMap::new();
    for code in currencies {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "" => {}
            "IDR" => {
                out.insert(code, 1.0);
            }
            "USD" => {
                out.insert(code, idr_per_usd);
            }
            _ => {
                if let Some(&per_usd) = usd_base.get(&code) {
                    if per_usd > 0.0 {
                        out.insert(code, idr_per_usd / per_usd);
                    }
                }
            }
        }
    }

    // The base pair is always present.
    out.entry("IDR".to_string()).or_insert(1.0);
    out.entry("USD".to_string()).or_insert(idr_per_usd);
    out
}

fn fallback_rates(currencies: &[&str]) -> BTreeMap<String, f64> {
    let wanted: Vec<String> = currencies.iter().map(|c| c.trim().to_uppercase()).collect();
    IDR_FALLBACK
        .iter()
        .filter(|(code, _)| wanted.iter().any(|w| w == code))
        .map(|(code, value)| (code.to_string(), *value))
        .collect()
}

/// Convert `amount` between currencies via IDR, rounded to 2 decimals.
/// `None` when either currency is unknown to the snapshot.
pub fn convert(amount: f64, from: &str, to: &str, rates: &BTreeMap<String, f64>) -> Option<f64> {
    let from_rate = rates.get(&from.trim().to_uppercase())?;
    let to_rate = rates.get(&to.trim().to_uppercase())?;
    if *to_rate <= 0.0 {
        return None;
    }
    let in_idr = amount * from_rate;
    Some(round2(in_idr / to_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn usd_base() -> HashMap<String, f64> {
        HashMap::from([
            ("USD".to_string(), 1.0),
            ("IDR".to_string(), 16_000.0),
            ("EUR".to_string(), 0.5),
            ("XXX".to_string(), 0.0),
        ])
    }

    #[test]
    fn idr_map_derives_cross_rates() {
        let rates = idr_rates_from_usd_base(&usd_base(), &["IDR", "USD", "EUR", "XXX", "ZZZ"]);
        assert_eq!(rates.get("IDR"), Some(&1.0));
        assert_eq!(rates.get("USD"), Some(&16_000.0));
        // 1 EUR = 16000 / 0.5 = 32000 IDR.
        assert_eq!(rates.get("EUR"), Some(&32_000.0));
        // Zero and unknown quotes are dropped.
        assert!(!rates.contains_key("XXX"));
        assert!(!rates.contains_key("ZZZ"));
    }

    #[test]
    fn idr_map_is_empty_without_the_base_pair() {
        let mut missing_idr = usd_base();
        missing_idr.remove("IDR");
        assert!(idr_rates_from_usd_base(&missing_idr, DEFAULT_CURRENCIES).is_empty());
    }

    #[test]
    fn conversion_goes_through_idr() {
        let rates = fallback_rates(DEFAULT_CURRENCIES);
        assert_eq!(convert(100.0, "USD", "IDR", &rates), Some(1_575_000.0));
        assert_eq!(convert(1_575_000.0, "IDR", "USD", &rates), Some(100.0));
        assert_eq!(convert(1.0, "usd", " idr ", &rates), Some(15_750.0));
        assert_eq!(convert(5.0, "USD", "BTC", &rates), None);
    }

    #[test]
    fn unreachable_endpoint_degrades_to_fallback() {
        let client = Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let snapshot = snapshot_from(&client, "http://127.0.0.1:9/v6/latest/USD", DEFAULT_CURRENCIES);
        assert_eq!(snapshot.source, RateSource::Fallback);
        assert_eq!(snapshot.idr_per_unit.len(), DEFAULT_CURRENCIES.len());
        assert_eq!(snapshot.warnings.len(), 1);
        assert!(snapshot.as_of.is_none());
    }
}
