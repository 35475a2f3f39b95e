//! Pricing rules: flat base price by parcel size plus a per-kilometer
//! surcharge at the standard or route-discounted tariff.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::DistanceSource;
use crate::geo::Coordinate;
use crate::matcher::RouteMatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Error)]
#[error("unrecognized parcel size: {0}")]
pub struct ParseParcelSizeError(String);

impl FromStr for ParcelSize {
    type Err = ParseParcelSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "маленький" => Ok(Self::Small),
            "medium" | "средний" => Ok(Self::Medium),
            "large" | "большой" => Ok(Self::Large),
            other => Err(ParseParcelSizeError(other.to_string())),
        }
    }
}

/// Flat base prices per parcel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl PriceTable {
    pub fn base_for(&self, size: ParcelSize) -> f64 {
        match size {
            ParcelSize::Small => self.small,
            ParcelSize::Medium => self.medium,
            ParcelSize::Large => self.large,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            small: 350.0,
            medium: 600.0,
            large: 900.0,
        }
    }
}

/// Per-kilometer tariffs for the round-trip distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariffs {
    pub standard_per_km: f64,
    /// Applied when the delivery rides along a wholesale route and the
    /// customer explicitly confirmed that option.
    pub route_per_km: f64,
}

impl Default for Tariffs {
    fn default() -> Self {
        Self {
            standard_per_km: 32.0,
            route_per_km: 15.0,
        }
    }
}

/// Everything the pricing rules need about one delivery.
#[derive(Debug, Clone)]
pub struct PricingRequest {
    pub parcel_size: ParcelSize,
    pub locality: String,
    pub destination: Coordinate,
    pub within_hub: bool,
    /// Round-trip distance; ignored when `within_hub` is set.
    pub distance_km: f64,
    pub route_match: Option<RouteMatch>,
    pub user_confirmed_route_discount: bool,
    pub distance_source: DistanceSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub base_price: f64,
    pub surcharge: f64,
    pub total: f64,
    pub tariff_per_km: f64,
    pub distance_source: DistanceSource,
}

/// Price one delivery.
///
/// In-boundary deliveries are flat-rate: zero surcharge and tariff no
/// matter what distance or route match was passed in. Otherwise the
/// discounted tariff applies only when a route matched AND the customer
/// confirmed it; any other combination bills the standard tariff.
///
/// Rounding rule: surcharge and total are rounded to two decimals
/// (kopecks). This is the only money rounding anywhere in the crate.
pub fn price(request: &PricingRequest, prices: &PriceTable, tariffs: &Tariffs) -> PricingResult {
    let base_price = prices.base_for(request.parcel_size);

    if request.within_hub {
        return PricingResult {
            base_price,
            surcharge: 0.0,
            total: base_price,
            tariff_per_km: 0.0,
            distance_source: DistanceSource::InBoundary,
        };
    }

    let discounted = request.route_match.is_some() && request.user_confirmed_route_discount;
    let tariff_per_km = if discounted {
        tariffs.route_per_km
    } else {
        tariffs.standard_per_km
    };
    let surcharge = round_money(request.distance_km * tariff_per_km);

    PricingResult {
        base_price,
        surcharge,
        total: round_money(base_price + surcharge),
        tariff_per_km,
        distance_source: request.distance_source,
    }
}

fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
