//! Helper functions to generate fixture coordinates.
//!
//! Mostly useful for tests and demos that need a cloud of positions
//! around some center without hand-writing them.

use rand::Rng;

use crate::types::coordinate::Coordinate;
use crate::utils::haversine::EARTH_RADIUS_METERS;

/// Generates `count` random coordinates within `radius_meters` of
/// `center`.
///
/// Uses a small-displacement planar approximation, which is fine for
/// the radii geofences work at (meters to tens of kilometers).
pub fn generate_positions_near(
    center: &Coordinate,
    radius_meters: f64,
    count: usize,
) -> Vec<Coordinate> {
    let mut rng = rand::thread_rng();
    let degrees_per_meter = (1.0 / EARTH_RADIUS_METERS).to_degrees();
    let lon_scale = center.latitude.to_radians().cos().max(1e-6);

    (0..count)
        .map(|_| {
            let bearing: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let distance: f64 = rng.gen_range(0.0..radius_meters);
            Coordinate {
                latitude: center.latitude + bearing.sin() * distance * degrees_per_meter,
                longitude: center.longitude
                    + bearing.cos() * distance * degrees_per_meter / lon_scale,
            }
        })
        .collect()
}
