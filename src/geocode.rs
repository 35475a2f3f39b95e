//! Geocoding collaborator port and the Nominatim adapter.
//!
//! The core only needs coordinates, a normalized locality, and the
//! hub-boundary verdict; everything else about geocoding stays behind
//! the [`Geocoder`] trait.

use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;
use crate::locality::{self, HubBoundary};

/// Address components as reported by the geocoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressDetails {
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub hamlet: Option<String>,
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
}

/// A successfully geocoded delivery address.
#[derive(Debug, Clone)]
pub struct Geocoded {
    pub coord: Coordinate,
    pub display_name: String,
    /// Raw settlement name, for display.
    pub settlement: String,
    /// Normalized settlement name; cache and table lookups key on this.
    pub locality: String,
    /// Whether the address lies inside the hub city boundary.
    pub within_hub: bool,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The address could not be resolved to coordinates. Fatal to the
    /// pricing request; the caller asks the user to clarify.
    #[error("address not found")]
    NotFound,
    #[error("geocoding service failure: {0}")]
    Service(String),
}

/// Resolves a free-text address to coordinates and locality data.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Geocoded, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "delivery-pricer/0.2".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Blocking Nominatim search adapter.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    boundary: HubBoundary,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig, boundary: HubBoundary) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            boundary,
            client,
        })
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Geocoded, GeocodeError> {
        let url = format!("{}/search", self.config.base_url);
        let hits = self
            .client
            .get(url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<NominatimHit>>())
            .map_err(|err| GeocodeError::Service(err.to_string()))?;

        let hit = hits.into_iter().next().ok_or(GeocodeError::NotFound)?;
        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| GeocodeError::Service("unparseable latitude".to_string()))?;
        let lon: f64 = hit
            .lon
            .parse()
            .map_err(|_| GeocodeError::Service("unparseable longitude".to_string()))?;

        let settlement = locality::extract_settlement(&hit.address, &hit.display_name);
        Ok(Geocoded {
            coord: Coordinate::new(lon, lat),
            within_hub: self.boundary.contains(&hit.address),
            locality: locality::normalize(&settlement),
            settlement,
            display_name: hit.display_name,
        })
    }
}

/// Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: AddressDetails,
}
