//! Great-circle distance and containment primitives.
//!
//! Pure functions, no side effects. Accuracy is standard haversine:
//! under 0.5% error for distances below 100 km, which is well within
//! what circular geofence checks need.

use crate::types::coordinate::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Computes the haversine great-circle distance between two
/// coordinates, in meters.
///
/// Symmetric: `distance_meters(a, b) == distance_meters(b, a)`.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_METERS * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Containment test with an inclusive boundary: a point exactly
/// `radius_meters` from the center counts as inside.
pub fn is_inside(point: &Coordinate, center: &Coordinate, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}
