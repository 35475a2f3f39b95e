//! Tver-region test fixtures: settlements around the hub city and the
//! wholesale route circuits used by integration tests.

use delivery_pricer::catalog::{Route, RouteCatalog};
use delivery_pricer::geo::Coordinate;

/// A named settlement with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl Place {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }

    pub fn coord(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }
}

// ============================================================================
// Settlements around Tver
// ============================================================================

/// Southeast of Tver, along the Konakovo direction.
pub const KONAKOVO: Place = Place::new("Конаково", 36.7634, 56.7008);
pub const GORODNYA: Place = Place::new("Городня", 36.3050, 56.7080);

/// Northwest of Tver, along the Likhoslavl direction.
pub const MEDNOE: Place = Place::new("Медное", 35.6693, 56.9708);
pub const LIKHOSLAVL: Place = Place::new("Лихославль", 35.4607, 57.1242);

/// Inside the city of Tver.
pub const TVER_CENTER: Place = Place::new("Тверь", 35.9116, 56.8587);

// ============================================================================
// Wholesale route circuits
// ============================================================================

/// Tuesday circuit toward Konakovo and Klin.
pub fn konakovo_route() -> Route {
    Route {
        name: "КВ_КЛ".to_string(),
        active_days: vec![1],
        waypoints: vec![
            Coordinate::new(36.1650, 56.7600),
            GORODNYA.coord(),
            Coordinate::new(36.4550, 56.7050),
            Coordinate::new(36.6100, 56.7020),
            KONAKOVO.coord(),
            Coordinate::new(36.7300, 56.5200),
        ],
    }
}

/// Monday/Thursday circuit toward Mednoe and Likhoslavl.
pub fn likhoslavl_route() -> Route {
    Route {
        name: "ЛХ_МД".to_string(),
        active_days: vec![0, 3],
        waypoints: vec![
            Coordinate::new(35.7800, 56.9200),
            MEDNOE.coord(),
            Coordinate::new(35.5600, 57.0500),
            LIKHOSLAVL.coord(),
        ],
    }
}

pub fn catalog() -> RouteCatalog {
    RouteCatalog::new(vec![konakovo_route(), likhoslavl_route()])
}
