use std::f64::consts::PI;

use crate::config::Sampling;
use crate::geo::project_polar;
use crate::models::Coordinate;
use crate::rng::SeededRng;

/// Computes the target candidate count for a disk of the given radius,
/// clamped to the configured bounds.
///
/// # Arguments
///
/// * 'radius_km' - search radius, km
/// * 'cfg' - sampling bounds and density
pub fn target_count(radius_km: f64, cfg: &Sampling) -> usize {
    let raw = (radius_km * radius_km * cfg.density_per_km2).round();
    raw.clamp(cfg.min_candidates as f64, cfg.max_candidates as f64) as usize
}

/// Draws `n` points uniformly distributed inside a disk of `radius_km`
/// around `center`, using `r = radius_km * sqrt(u)` to avoid radial
/// crowding near the center.
///
/// # Arguments
///
/// * 'center' - disk center
/// * 'radius_km' - disk radius, km
/// * 'n' - number of points to draw
/// * 'rng' - seeded RNG; caller owns the seed so the sequence is reproducible
pub fn sample_disk(center: Coordinate, radius_km: f64, n: usize, rng: &mut SeededRng) -> Vec<Coordinate> {
    let mut points = Vec::with_capacity(n);
    for _ in 0..n {
        let u = rng.next_f64();
        let v = rng.next_f64();
        let r = radius_km * u.sqrt();
        let theta = 2.0 * PI * v;
        points.push(project_polar(center, r, theta));
    }
    points
}
