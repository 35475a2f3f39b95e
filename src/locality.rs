//! Locality extraction and normalization.
//!
//! Distance lookups are keyed by locality, not by exact address: two
//! addresses that normalize to the same locality share cached distance
//! data. Normalization therefore has to be a single stable function, not
//! scattered string heuristics.

use serde::{Deserialize, Serialize};

use crate::geocode::AddressDetails;

/// Administrative prefixes stripped from settlement names before they are
/// used as lookup keys ("посёлок Заволжский" and "Заволжский" must key the
/// same cache entry).
const SETTLEMENT_PREFIXES: &[&str] = &[
    "посёлок",
    "поселок",
    "пгт",
    "деревня",
    "село",
    "город",
    "станция",
];

/// Normalize a settlement name into a cache/table lookup key.
///
/// Trims, lowercases, strips leading administrative prefixes, and
/// collapses inner whitespace. Pure and total: any input yields a key,
/// possibly empty.
pub fn normalize(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    while let Some(first) = tokens.first() {
        if SETTLEMENT_PREFIXES.contains(first) && tokens.len() > 1 {
            tokens.remove(0);
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Extract the settlement name from geocoder address components.
///
/// Takes the first populated component in decreasing specificity order,
/// falling back to the first comma-delimited segment of the display name.
pub fn extract_settlement(details: &AddressDetails, display_name: &str) -> String {
    let components = [
        &details.village,
        &details.town,
        &details.city,
        &details.hamlet,
        &details.suburb,
        &details.neighbourhood,
    ];
    for component in components {
        if let Some(name) = component {
            if !name.trim().is_empty() {
                return name.trim().to_string();
            }
        }
    }
    display_name
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Name-match heuristic for "is this address inside the hub city".
///
/// The geocoder's administrative components are matched against the hub
/// city's known names; district-level fields are matched against a stem
/// plus an urban-district qualifier, since the geocoder sometimes reports
/// the city only at municipality/county level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubBoundary {
    /// Exact lowercased names identifying the hub city in city/town fields.
    pub city_names: Vec<String>,
    /// Stem matched against district-level fields.
    pub district_stem: String,
    /// At least one qualifier must accompany the stem in a district field.
    pub district_qualifiers: Vec<String>,
}

impl HubBoundary {
    pub fn contains(&self, details: &AddressDetails) -> bool {
        for field in [&details.city, &details.town] {
            if let Some(value) = field {
                let value = value.trim().to_lowercase();
                if self.city_names.iter().any(|name| *name == value) {
                    return true;
                }
            }
        }
        for field in [&details.municipality, &details.county, &details.state_district] {
            if let Some(value) = field {
                let value = value.to_lowercase();
                if value.contains(&self.district_stem)
                    && self.district_qualifiers.iter().any(|q| value.contains(q))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Administrative boundary of the city of Tver.
    pub fn tver() -> Self {
        Self {
            city_names: vec![
                "тверь".to_string(),
                "город тверь".to_string(),
                "tver".to_string(),
            ],
            district_stem: "твер".to_string(),
            district_qualifiers: vec!["город".to_string(), "городской округ".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_prefix_and_case() {
        assert_eq!(normalize("посёлок Заволжский"), "заволжский");
        assert_eq!(normalize("  Конаково "), "конаково");
        assert_eq!(normalize("деревня Мермерины"), "мермерины");
    }

    #[test]
    fn test_normalize_keeps_bare_prefix_word() {
        // A name that consists only of a prefix word stays as-is.
        assert_eq!(normalize("Село"), "село");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("город   Конаково"), "конаково");
    }

    #[test]
    fn test_extract_settlement_prefers_village() {
        let details = AddressDetails {
            village: Some("Медное".to_string()),
            town: Some("Конаково".to_string()),
            ..AddressDetails::default()
        };
        assert_eq!(extract_settlement(&details, "ignored"), "Медное");
    }

    #[test]
    fn test_extract_settlement_falls_back_to_display_name() {
        let details = AddressDetails::default();
        let settlement = extract_settlement(&details, "Радченко, Конаковский район, Тверская область");
        assert_eq!(settlement, "Радченко");
    }

    #[test]
    fn test_extract_settlement_empty_input() {
        assert_eq!(extract_settlement(&AddressDetails::default(), ""), "");
    }

    #[test]
    fn test_hub_boundary_matches_city_field() {
        let boundary = HubBoundary::tver();
        let details = AddressDetails {
            city: Some("Тверь".to_string()),
            ..AddressDetails::default()
        };
        assert!(boundary.contains(&details));
    }

    #[test]
    fn test_hub_boundary_matches_urban_district() {
        let boundary = HubBoundary::tver();
        let details = AddressDetails {
            county: Some("городской округ Тверь".to_string()),
            ..AddressDetails::default()
        };
        assert!(boundary.contains(&details));
    }

    #[test]
    fn test_hub_boundary_rejects_region_only() {
        let boundary = HubBoundary::tver();
        let details = AddressDetails {
            county: Some("Конаковский район".to_string()),
            ..AddressDetails::default()
        };
        assert!(!boundary.contains(&details));
    }
}
