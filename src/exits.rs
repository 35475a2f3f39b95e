//! Exit-point network: the fixed road egress coordinates from the hub city.
//!
//! Loaded once at startup and never mutated; every outbound delivery is
//! priced from its nearest exit point.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, Coordinate};

/// One named road egress point from the hub city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    pub name: String,
    pub coord: Coordinate,
}

impl ExitPoint {
    pub fn new(name: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            name: name.into(),
            coord,
        }
    }
}

/// The catalog of exit points, in a fixed administrator-defined order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExitNetwork {
    points: Vec<ExitPoint>,
}

impl ExitNetwork {
    pub fn new(points: Vec<ExitPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ExitPoint] {
        &self.points
    }

    /// Nearest exit point by straight-line distance, with the distance to it.
    ///
    /// Linear scan with a strict `<` comparison, so ties go to the first
    /// entry in catalog order. `None` only for an empty network.
    pub fn nearest(&self, destination: Coordinate) -> Option<(&ExitPoint, f64)> {
        let mut best: Option<(&ExitPoint, f64)> = None;
        for point in &self.points {
            let d = haversine_km(destination, point.coord);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((point, d)),
            }
        }
        best
    }

    /// The seven exit points of the Tver deployment.
    pub fn tver() -> Self {
        let coords = [
            (36.055364, 56.795587),
            (35.871802, 56.808677),
            (35.804913, 56.831684),
            (36.020937, 56.850973),
            (35.797443, 56.882207),
            (35.932805, 56.902966),
            (35.783293, 56.844247),
        ];
        Self::new(
            coords
                .iter()
                .enumerate()
                .map(|(i, &(lon, lat))| ExitPoint::new(format!("exit-{}", i + 1), Coordinate::new(lon, lat)))
                .collect(),
        )
    }
}
