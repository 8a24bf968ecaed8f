use crate::models::Coordinate;

/// Mean earth radius used throughout, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in km.
///
/// # Arguments
///
/// * 'a' - first coordinate
/// * 'b' - second coordinate
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    (EARTH_RADIUS_KM * c).max(0.0)
}

/// Projects a polar offset `(r_km, theta_rad)` around `center` to a
/// coordinate, using a local equirectangular approximation. Not valid for
/// astronomy; only for sampling and spacing over short distances.
///
/// # Arguments
///
/// * 'center' - anchor coordinate
/// * 'r_km' - radial distance from center, km
/// * 'theta_rad' - angle from due east, counter-clockwise, radians
pub fn project_polar(center: Coordinate, r_km: f64, theta_rad: f64) -> Coordinate {
    let dx_km = r_km * theta_rad.cos();
    let dy_km = r_km * theta_rad.sin();

    let km_per_deg_lat = 111.0;
    let km_per_deg_lng = 111.0 * center.lat.to_radians().cos();

    let dlat = dy_km / km_per_deg_lat;
    let dlng = if km_per_deg_lng.abs() > 1e-9 { dx_km / km_per_deg_lng } else { 0.0 };

    Coordinate::new(center.lat + dlat, center.lng + dlng)
}
