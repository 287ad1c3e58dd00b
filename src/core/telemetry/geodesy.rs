use crate::core::telemetry::SimplePoint;

/// Haversine distance in meters on a sphere of the ellipsoid's mean radius
/// `(2a + b) / 3`.
pub fn great_circle_distance(from: &SimplePoint, to: &SimplePoint, a: f64, b: f64) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let half_dlat = (to.lat - from.lat).to_radians() / 2.0;
    let half_dlon = (to.lon - from.lon).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    central_angle * mean_radius(a, b)
}

pub fn mean_radius(a: f64, b: f64) -> f64 {
    (2.0 * a + b) / 3.0
}
