//! Day-indexed catalog of scheduled wholesale delivery routes.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Weekday index with Monday = 0 .. Sunday = 6, used everywhere in the
/// system; the catalog is never Sunday-first.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// A scheduled wholesale delivery circuit.
///
/// Waypoints are already-materialized coordinates in travel order;
/// resolving named stops to coordinates is a one-time build step outside
/// this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Days the route runs, 0 = Monday .. 6 = Sunday.
    pub active_days: Vec<u8>,
    pub waypoints: Vec<Coordinate>,
}

impl Route {
    pub fn is_active_on(&self, weekday: u8) -> bool {
        self.active_days.contains(&weekday)
    }
}

/// Read-mostly catalog of routes, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes running on the given weekday, in catalog order.
    ///
    /// Catalog order is design-visible: the matcher takes the first
    /// qualifying route, not the globally closest one.
    pub fn active_on(&self, weekday: u8) -> impl Iterator<Item = &Route> {
        self.routes
            .iter()
            .filter(move |route| route.is_active_on(weekday))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
