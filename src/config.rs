//! Administrative configuration, constructed once at startup and passed
//! by reference into the quote service. Never mutated at runtime;
//! rebuilding it is an explicit administrative action.

use serde::{Deserialize, Serialize};

use crate::matcher::MatcherConfig;
use crate::pricing::{PriceTable, Tariffs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_prices: PriceTable,
    pub tariffs: Tariffs,
    pub matcher: MatcherConfig,
}

impl PricingConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_values() {
        let config = PricingConfig::default();
        assert_eq!(config.base_prices.small, 350.0);
        assert_eq!(config.tariffs.standard_per_km, 32.0);
        assert_eq!(config.tariffs.route_per_km, 15.0);
        assert_eq!(config.matcher.threshold_km, 10.0);
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let config = PricingConfig::from_json(r#"{"matcher": {"threshold_km": 12.5, "candidate_waypoints": 10, "strategy": "road_to_waypoint"}}"#).unwrap();
        assert_eq!(config.matcher.threshold_km, 12.5);
        assert_eq!(config.tariffs.standard_per_km, 32.0);
    }
}
