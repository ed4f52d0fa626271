//! Point and bounding-square geometry.

use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// A queried point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned square polygon around a [`Position`].
///
/// The ring is closed (first vertex repeated last) and ordered
/// counter-clockwise from the south-west corner, each vertex as `[lng, lat]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    ring: Vec<[f64; 2]>,
}

impl Boundary {
    /// Buffer `position` by `radius_meters` and take the bounding box of the
    /// buffered disc.
    pub fn around(position: Position, radius_meters: f64) -> Self {
        let meters_per_degree = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        let d_lat = radius_meters / meters_per_degree;
        let d_lng = radius_meters / (meters_per_degree * position.lat.to_radians().cos());

        let (west, east) = (position.lng - d_lng, position.lng + d_lng);
        let (south, north) = (position.lat - d_lat, position.lat + d_lat);

        Self {
            ring: vec![
                [west, south],
                [east, south],
                [east, north],
                [west, north],
                [west, south],
            ],
        }
    }

    /// The closed coordinate ring.
    pub fn ring(&self) -> &[[f64; 2]] {
        &self.ring
    }

    /// GeoJSON polygon coordinates: a list holding the single outer ring.
    pub fn polygon_coordinates(&self) -> Vec<Vec<[f64; 2]>> {
        vec![self.ring.clone()]
    }

    /// `(west, south, east, north)` extents in degrees.
    pub fn extents(&self) -> (f64, f64, f64, f64) {
        let [west, south] = self.ring[0];
        let [east, north] = self.ring[2];
        (west, south, east, north)
    }
}
