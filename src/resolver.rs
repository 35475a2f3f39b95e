//! Layered distance resolution: curated table, cache, live routing,
//! straight-line fallback.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{DistanceCache, DistanceRecord, DistanceSource};
use crate::geo::{road_estimate_km, Coordinate};
use crate::routing::RoadDistanceProvider;

/// Curated round-trip road distances keyed by normalized locality.
///
/// Entries here are hand-maintained and trusted over anything previously
/// computed, including the cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceTable {
    entries: HashMap<String, f64>,
}

impl DistanceTable {
    pub fn new(entries: HashMap<String, f64>) -> Self {
        Self { entries }
    }

    pub fn get(&self, locality: &str) -> Option<f64> {
        self.entries.get(locality).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The curated table of the Tver deployment (round-trip km).
    pub fn tver() -> Self {
        let entries = [
            ("изоплит", 66.456),
            ("заволжский", 5.930),
            ("радченко", 47.366),
            ("бурашево", 24.328),
            ("мермерины", 24.406),
            ("завидово", 99.622),
            ("калашниково", 151.274),
            ("медное", 49.166),
            ("вараксино", 95.840),
            ("колталово", 51.296),
            ("конаково", 134.000),
        ];
        Self::new(
            entries
                .iter()
                .map(|&(name, km)| (name.to_string(), km))
                .collect(),
        )
    }
}

/// Resolves round-trip road distances through the table → cache → live →
/// fallback chain, writing computed results through to the cache.
pub struct DistanceResolver<'a, C: ?Sized, R: ?Sized> {
    table: &'a DistanceTable,
    cache: &'a C,
    router: &'a R,
}

impl<'a, C, R> DistanceResolver<'a, C, R>
where
    C: DistanceCache + ?Sized,
    R: RoadDistanceProvider + ?Sized,
{
    pub fn new(table: &'a DistanceTable, cache: &'a C, router: &'a R) -> Self {
        Self {
            table,
            cache,
            router,
        }
    }

    /// Resolve the round-trip road distance from `exit_point` to
    /// `destination`, keyed by `locality`.
    ///
    /// Resolution short-circuits at the first hit: curated table, then
    /// cache, then a live routing query, then the straight-line fallback.
    /// A cached record is returned with its stored exit point: the exit
    /// point a locality was first computed against stays authoritative
    /// for it, even if the exit catalog would pick differently today.
    /// Live and fallback results are doubled for the round trip, rounded
    /// to 3 decimals, and written through to the cache.
    ///
    /// A round-trip of zero is returned as-is; deciding that an address
    /// carries no surcharge belongs to the in-boundary flag upstream,
    /// never to this resolver.
    pub fn resolve(
        &self,
        locality: &str,
        exit_point: Coordinate,
        destination: Coordinate,
    ) -> DistanceRecord {
        if let Some(round_trip_km) = self.table.get(locality) {
            debug!(locality, round_trip_km, "distance from curated table");
            return DistanceRecord {
                locality: locality.to_string(),
                round_trip_km,
                exit_point,
                source: DistanceSource::Table,
            };
        }

        if let Some(mut record) = self.cache.get(locality) {
            debug!(locality, round_trip_km = record.round_trip_km, "distance from cache");
            record.source = DistanceSource::Cache;
            return record;
        }

        let (one_way_km, source) = match self.router.one_way_km(exit_point, destination) {
            Ok(km) => (km, DistanceSource::Live),
            Err(err) => {
                warn!(locality, error = %err, "routing unavailable, using straight-line fallback");
                (road_estimate_km(exit_point, destination), DistanceSource::Fallback)
            }
        };

        let record = DistanceRecord {
            locality: locality.to_string(),
            round_trip_km: round3(one_way_km * 2.0),
            exit_point,
            source,
        };
        self.cache.put(locality, record.clone());
        record
    }
}

fn round3(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}
