use crate::config::constant::EARTH_RADIUS_M;
use crate::domain::types::Coordinate;

/// Great-circle distance between two coordinates, rounded to the nearest meter.
pub fn haversine_meters(origin: Coordinate, destination: Coordinate) -> u64 {
    let (lat1, lon1) = (origin.lat.to_radians(), origin.lon.to_radians());
    let (lat2, lon2) = (destination.lat.to_radians(), destination.lon.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let meters = EARTH_RADIUS_M * c;

    if meters.is_finite() {
        meters.round() as u64
    } else {
        0
    }
}
