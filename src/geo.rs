//! Geographic primitives: great-circle distance, point-to-segment
//! distance, point-in-polygon.
//!
//! Pure math, no I/O. These sit on the hot path, so malformed input
//! (NaN coordinates) propagates NaN/`false` instead of erroring.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers (IUGG mean radius).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Empirical multiplier converting straight-line distance to an
/// approximate road distance when live routing is unavailable.
pub const ROAD_CORRECTION_FACTOR: f64 = 1.3;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Great-circle distance between two points in kilometers.
///
/// Symmetric, and zero iff both points are equal.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Straight-line distance scaled to an approximate road distance.
pub fn road_estimate_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_km(a, b) * ROAD_CORRECTION_FACTOR
}

/// Distance from `p` to the nearest point of segment `a`–`b` in kilometers.
///
/// Projects onto the segment in a local equirectangular frame with the
/// fraction clamped to [0, 1], then measures great-circle distance to the
/// clamped point. Degenerates to `haversine_km(p, a)` when `a == b`.
pub fn point_to_segment_km(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let scale = ((a.lat + b.lat) / 2.0).to_radians().cos();

    let (ax, ay) = (a.lon * scale, a.lat);
    let (bx, by) = (b.lon * scale, b.lat);
    let (px, py) = (p.lon * scale, p.lat);

    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };

    let nearest = Coordinate::new(a.lon + (b.lon - a.lon) * t, a.lat + (b.lat - a.lat) * t);
    haversine_km(p, nearest)
}

/// Ray-casting parity test for `p` against an ordered polygon ring.
///
/// Rings with fewer than 3 vertices are not an error, just "not inside".
pub fn point_in_polygon(p: Coordinate, ring: &[Coordinate]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (vi, vj) = (ring[i], ring[j]);
        if (vi.lat > p.lat) != (vj.lat > p.lat) {
            let crossing = (vj.lon - vi.lon) * (p.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon;
            if p.lon < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
