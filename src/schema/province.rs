//! Province-name canonicalization.
//!
//! Upstream sources disagree on spelling: BPS exports shout in
//! uppercase ("DKI JAKARTA"), some tables abbreviate ("Kep. Riau"),
//! others use the long official form ("Kepulauan Bangka Belitung").
//! Everything is folded to the dashboard's standard names so that
//! grouping and map joins line up.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Known uppercase spellings, applied before title-casing.
static PRE_TITLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ACEH", "Aceh"),
        ("BALI", "Bali"),
        ("BANTEN", "Banten"),
        ("BENGKULU", "Bengkulu"),
        ("DI YOGYAKARTA", "DI Yogyakarta"),
        ("DKI JAKARTA", "DKI Jakarta"),
        ("GORONTALO", "Gorontalo"),
        ("JAMBI", "Jambi"),
        ("JAWA BARAT", "Jawa Barat"),
        ("JAWA TENGAH", "Jawa Tengah"),
        ("JAWA TIMUR", "Jawa Timur"),
        ("KALIMANTAN BARAT", "Kalimantan Barat"),
        ("KALIMANTAN SELATAN", "Kalimantan Selatan"),
        ("KALIMANTAN TENGAH", "Kalimantan Tengah"),
        ("KALIMANTAN TIMUR", "Kalimantan Timur"),
        ("KALIMANTAN UTARA", "Kalimantan Utara"),
        ("KEPULAUAN BANGKA BELITUNG", "Bangka Belitung"),
        ("KEPULAUAN RIAU", "Kepulauan Riau"),
        ("LAMPUNG", "Lampung"),
        ("MALUKU", "Maluku"),
        ("PAPUA BARAT DAYA", "Papua Barat Daya"),
    ])
});

/// Variants that only show up after title-casing.
static POST_TITLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Di Yogyakarta", "DI Yogyakarta"),
        ("Dki Jakarta", "DKI Jakarta"),
        ("Kep. Bangka Belitung", "Bangka Belitung"),
        ("Kep. Riau", "Kepulauan Riau"),
        ("Kepulauan Bangka Belitung", "Bangka Belitung"),
    ])
});

/// Fold a raw province cell to its standard name.
pub fn canonical(raw: &str) -> String {
    let trimmed = raw.trim();
    let mapped = PRE_TITLE.get(trimmed).copied().unwrap_or(trimmed);
    let titled = title_case(mapped);
    POST_TITLE
        .get(titled.as_str())
        .map(|s| s.to_string())
        .unwrap_or(titled)
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_bps_spellings_fold_to_standard() {
        assert_eq!(canonical("DKI JAKARTA"), "DKI Jakarta");
        assert_eq!(canonical("DI YOGYAKARTA"), "DI Yogyakarta");
        assert_eq!(canonical("KEPULAUAN BANGKA BELITUNG"), "Bangka Belitung");
        assert_eq!(canonical("JAWA BARAT"), "Jawa Barat");
    }

    #[test]
    fn abbreviations_and_long_forms_fold_too() {
        assert_eq!(canonical("Kep. Riau"), "Kepulauan Riau");
        assert_eq!(canonical("Kepulauan Bangka Belitung"), "Bangka Belitung");
    }

    #[test]
    fn unknown_names_are_title_cased() {
        assert_eq!(canonical("sulawesi tenggara"), "Sulawesi Tenggara");
        assert_eq!(canonical("  Bali  "), "Bali");
        assert_eq!(canonical("NUSA TENGGARA BARAT"), "Nusa Tenggara Barat");
    }
}
