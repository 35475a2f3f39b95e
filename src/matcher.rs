//! Route-proximity matching: does any route running on the chosen day
//! pass close enough to the destination for the discounted tariff.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Route, RouteCatalog};
use crate::geo::{haversine_km, point_to_segment_km, Coordinate, ROAD_CORRECTION_FACTOR};
use crate::routing::RoadDistanceProvider;

/// A qualifying route for a given destination and weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub route_name: String,
    /// The route waypoint the deviation was measured against.
    pub waypoint: Coordinate,
    pub deviation_km: f64,
}

/// How route deviation is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStrategy {
    /// Road distance to the closest waypoints, with a straight-line
    /// pre-filter to bound the number of routing calls.
    RoadToWaypoint,
    /// Geometric distance to the route polyline, no routing calls.
    Polyline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum road deviation for an address to count as "on the way".
    pub threshold_km: f64,
    /// How many of the closest waypoints get a road-distance check.
    pub candidate_waypoints: usize,
    pub strategy: DeviationStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold_km: 10.0,
            candidate_waypoints: 8,
            strategy: DeviationStrategy::RoadToWaypoint,
        }
    }
}

/// Finds the first qualifying route for a destination and weekday.
pub struct RouteMatcher<'a, R: ?Sized> {
    catalog: &'a RouteCatalog,
    router: &'a R,
    config: MatcherConfig,
}

impl<'a, R> RouteMatcher<'a, R>
where
    R: RoadDistanceProvider + ?Sized,
{
    pub fn new(catalog: &'a RouteCatalog, router: &'a R, config: MatcherConfig) -> Self {
        Self {
            catalog,
            router,
            config,
        }
    }

    /// First route in catalog order active on `weekday` whose deviation
    /// from `destination` is within the threshold, or `None`.
    ///
    /// First-fit, not best-fit: the scan stops at the first qualifying
    /// route even if a later one deviates less. Routing calls are
    /// expensive and one qualifying route is enough for the discount.
    pub fn matches(&self, destination: Coordinate, weekday: u8) -> Option<RouteMatch> {
        for route in self.catalog.active_on(weekday) {
            let Some(candidate) = self.route_deviation(route, destination) else {
                continue;
            };
            if candidate.deviation_km <= self.config.threshold_km {
                debug!(
                    route = %candidate.route_name,
                    deviation_km = candidate.deviation_km,
                    "route match found"
                );
                return Some(candidate);
            }
        }
        None
    }

    fn route_deviation(&self, route: &Route, destination: Coordinate) -> Option<RouteMatch> {
        match self.config.strategy {
            DeviationStrategy::RoadToWaypoint => self.waypoint_deviation(route, destination),
            DeviationStrategy::Polyline => polyline_deviation(route, destination),
        }
    }

    /// Minimum road distance from the destination to the route's closest
    /// waypoints. Waypoints are ranked by straight-line distance first so
    /// only `candidate_waypoints` of them cost a routing call; a failed
    /// call degrades that candidate to the scaled straight-line estimate.
    fn waypoint_deviation(&self, route: &Route, destination: Coordinate) -> Option<RouteMatch> {
        let mut ranked: Vec<(f64, Coordinate)> = route
            .waypoints
            .iter()
            .map(|&wp| (haversine_km(destination, wp), wp))
            .collect();
        if ranked.is_empty() {
            return None;
        }
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(self.config.candidate_waypoints.max(1));

        let mut best: Option<(f64, Coordinate)> = None;
        for (straight_km, waypoint) in ranked {
            let road_km = match self.router.one_way_km(destination, waypoint) {
                Ok(km) => km,
                Err(err) => {
                    debug!(route = %route.name, error = %err, "road deviation unavailable, estimating");
                    straight_km * ROAD_CORRECTION_FACTOR
                }
            };
            if best.map_or(true, |(b, _)| road_km < b) {
                best = Some((road_km, waypoint));
            }
        }
        best.map(|(deviation_km, waypoint)| RouteMatch {
            route_name: route.name.clone(),
            waypoint,
            deviation_km,
        })
    }
}

/// Deviation against the route treated as a polyline, scaled by the road
/// correction factor so it compares against the same road-ish threshold
/// as the routed strategy. Single-waypoint routes degrade to the distance
/// to that waypoint.
fn polyline_deviation(route: &Route, destination: Coordinate) -> Option<RouteMatch> {
    let waypoints = &route.waypoints;
    let first = *waypoints.first()?;

    let mut best_km = haversine_km(destination, first);
    let mut best_wp = first;
    for pair in waypoints.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let d = point_to_segment_km(destination, a, b);
        if d < best_km {
            best_km = d;
            // Report the nearer endpoint of the best segment.
            best_wp = if haversine_km(destination, a) <= haversine_km(destination, b) {
                a
            } else {
                b
            };
        }
    }

    Some(RouteMatch {
        route_name: route.name.clone(),
        waypoint: best_wp,
        deviation_km: best_km * ROAD_CORRECTION_FACTOR,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::routing::{NoRouting, RoutingError};

    /// Router stub that maps each waypoint to a scripted road distance
    /// and records how many calls it served.
    struct ScriptedRouter {
        per_km: f64,
        calls: Mutex<usize>,
    }

    impl ScriptedRouter {
        fn new(per_km: f64) -> Self {
            Self {
                per_km,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl RoadDistanceProvider for ScriptedRouter {
        fn one_way_km(&self, from: Coordinate, to: Coordinate) -> Result<f64, RoutingError> {
            *self.calls.lock().unwrap() += 1;
            Ok(haversine_km(from, to) * self.per_km)
        }
    }

    fn destination() -> Coordinate {
        Coordinate::new(36.70, 56.70)
    }

    fn route(name: &str, days: Vec<u8>, waypoints: Vec<Coordinate>) -> Route {
        Route {
            name: name.to_string(),
            active_days: days,
            waypoints,
        }
    }

    /// Two Tuesday routes, both passing near the destination; the far one
    /// is listed first.
    fn two_tuesday_routes() -> RouteCatalog {
        RouteCatalog::new(vec![
            route(
                "дальний",
                vec![1],
                vec![Coordinate::new(36.74, 56.72)],
            ),
            route(
                "ближний",
                vec![1],
                vec![Coordinate::new(36.705, 56.701)],
            ),
        ])
    }

    #[test]
    fn test_first_fit_wins_over_smaller_deviation() {
        let catalog = two_tuesday_routes();
        let router = ScriptedRouter::new(1.0);
        let matcher = RouteMatcher::new(&catalog, &router, MatcherConfig::default());

        let m = matcher.matches(destination(), 1).unwrap();
        assert_eq!(m.route_name, "дальний");
    }

    #[test]
    fn test_inactive_day_does_not_match() {
        let catalog = two_tuesday_routes();
        let router = ScriptedRouter::new(1.0);
        let matcher = RouteMatcher::new(&catalog, &router, MatcherConfig::default());

        assert!(matcher.matches(destination(), 2).is_none());
    }

    #[test]
    fn test_threshold_excludes_distant_routes() {
        let catalog = RouteCatalog::new(vec![route(
            "дальний",
            vec![1],
            vec![Coordinate::new(37.5, 57.3)],
        )]);
        let router = ScriptedRouter::new(1.0);
        let matcher = RouteMatcher::new(&catalog, &router, MatcherConfig::default());

        assert!(matcher.matches(destination(), 1).is_none());
    }

    #[test]
    fn test_candidate_limit_bounds_routing_calls() {
        let waypoints: Vec<Coordinate> = (0..20)
            .map(|i| Coordinate::new(36.7 + 0.01 * i as f64, 56.7))
            .collect();
        let catalog = RouteCatalog::new(vec![route("длинный", vec![1], waypoints)]);
        let router = ScriptedRouter::new(1.0);
        let config = MatcherConfig {
            candidate_waypoints: 5,
            ..MatcherConfig::default()
        };
        let matcher = RouteMatcher::new(&catalog, &router, config);

        matcher.matches(destination(), 1);
        assert_eq!(router.calls(), 5);
    }

    #[test]
    fn test_routing_failure_degrades_to_estimate() {
        let catalog = RouteCatalog::new(vec![route(
            "рядом",
            vec![1],
            vec![Coordinate::new(36.705, 56.701)],
        )]);
        let matcher = RouteMatcher::new(&catalog, &NoRouting, MatcherConfig::default());

        let m = matcher.matches(destination(), 1).unwrap();
        let straight = haversine_km(destination(), Coordinate::new(36.705, 56.701));
        assert!((m.deviation_km - straight * ROAD_CORRECTION_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_strategy_measures_against_segments() {
        // Destination sits right between two waypoints; segment distance
        // is near zero even though both endpoints are ~2 km away.
        let catalog = RouteCatalog::new(vec![route(
            "вдоль",
            vec![1],
            vec![Coordinate::new(36.66, 56.70), Coordinate::new(36.74, 56.70)],
        )]);
        let config = MatcherConfig {
            strategy: DeviationStrategy::Polyline,
            ..MatcherConfig::default()
        };
        let matcher = RouteMatcher::new(&catalog, &NoRouting, config);

        let m = matcher.matches(destination(), 1).unwrap();
        assert!(m.deviation_km < 0.1, "got {}", m.deviation_km);
    }

    #[test]
    fn test_empty_route_is_skipped() {
        let catalog = RouteCatalog::new(vec![
            route("пустой", vec![1], Vec::new()),
            route("рядом", vec![1], vec![Coordinate::new(36.705, 56.701)]),
        ]);
        let router = ScriptedRouter::new(1.0);
        let matcher = RouteMatcher::new(&catalog, &router, MatcherConfig::default());

        let m = matcher.matches(destination(), 1).unwrap();
        assert_eq!(m.route_name, "рядом");
    }
}
