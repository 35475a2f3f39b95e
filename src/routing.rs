//! Road-distance collaborator port and the OSRM adapter.

use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;

/// Why a road-distance query failed.
///
/// Callers only distinguish these for observability; every variant means
/// "use the straight-line fallback", never "retry".
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No routing backend is configured for this deployment.
    #[error("no routing backend configured")]
    MissingCredential,
    #[error("no road route found between the given points")]
    NoRoute,
    #[error("routing request timed out")]
    Timeout,
    #[error("routing service failure: {0}")]
    Service(String),
}

/// Provides one-way road distances between coordinate pairs.
pub trait RoadDistanceProvider {
    fn one_way_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, RoutingError>;
}

/// Stand-in provider for deployments without a routing backend.
///
/// Always reports [`RoutingError::MissingCredential`], pushing every
/// caller onto the straight-line fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRouting;

impl RoadDistanceProvider for NoRouting {
    fn one_way_km(&self, _from: Coordinate, _to: Coordinate) -> Result<f64, RoutingError> {
        Err(RoutingError::MissingCredential)
    }
}

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl RoadDistanceProvider for OsrmClient {
    fn one_way_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, RoutingError> {
        let url = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=false",
            self.config.base_url, self.config.profile, from.lon, from.lat, to.lon, to.lat
        );

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>());

        let body = match response {
            Ok(body) => body,
            Err(err) if err.is_timeout() => return Err(RoutingError::Timeout),
            Err(err) => return Err(RoutingError::Service(err.to_string())),
        };

        if body.code != "Ok" {
            return Err(RoutingError::NoRoute);
        }
        let route = body.routes.first().ok_or(RoutingError::NoRoute)?;
        Ok(route.distance / 1000.0)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Route length in meters.
    distance: f64,
}
