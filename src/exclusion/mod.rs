pub mod errors;
pub mod models;

use std::time::Duration;

use log::warn;
use ureq::Agent;

use crate::models::Coordinate;
use crate::retry;
use crate::wrapper;
use errors::ExclusionError;
use models::{FetchOptions, Geometry, Polygon, Ring};

/// Contract for an external polygon provider (spec.md §4.4 / §6).
///
/// Implementations may fail; the `ExclusionFilter` fails open (no
/// exclusion) on any error, logging a warning rather than aborting the
/// analysis.
pub trait PolygonProvider {
    fn fetch(&self, center: Coordinate, radius_km: f64, opts: FetchOptions) -> Result<Vec<Polygon>, ExclusionError>;
}

/// A provider that never returns any polygons; used when exclusion is
/// disabled or no real collaborator is wired in (e.g. in tests).
pub struct NoOpPolygonProvider;

impl PolygonProvider for NoOpPolygonProvider {
    fn fetch(&self, _center: Coordinate, _radius_km: f64, _opts: FetchOptions) -> Result<Vec<Polygon>, ExclusionError> {
        Ok(Vec::new())
    }
}

/// Fetches polygons from an external HTTP endpoint (e.g. an OpenStreetMap
/// derived service), mirroring `manager_nordpool`'s `ureq::Agent` pattern.
pub struct HttpPolygonProvider {
    agent: Agent,
    endpoint: String,
}

impl HttpPolygonProvider {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        let agent_config = Agent::config_builder().timeout_global(Some(Duration::from_secs(timeout_secs))).build();
        HttpPolygonProvider { agent: agent_config.into(), endpoint }
    }
}

impl PolygonProvider for HttpPolygonProvider {
    fn fetch(&self, center: Coordinate, radius_km: f64, opts: FetchOptions) -> Result<Vec<Polygon>, ExclusionError> {
        let lat = center.lat.to_string();
        let lng = center.lng.to_string();
        let radius = radius_km.to_string();
        let include_water = opts.include_water.to_string();
        let include_sensitive = opts.include_sensitive.to_string();
        let buffer_m = opts.buffer_m.to_string();
        let query = vec![
            ("lat", lat.as_str()),
            ("lng", lng.as_str()),
            ("radius_km", radius.as_str()),
            ("include_water", include_water.as_str()),
            ("include_sensitive", include_sensitive.as_str()),
            ("buffer_m", buffer_m.as_str()),
        ];

        let call = || -> Result<Vec<Polygon>, ExclusionError> {
            let mut response = self.agent.get(&self.endpoint).query_pairs(query.clone()).call()?;

            let json = response.body_mut().read_to_string()?;
            let polygons: Vec<Polygon> = serde_json::from_str(&json)?;
            Ok(polygons)
        };

        retry!(call)
    }
}

/// Point-in-polygon mask over the polygons returned by a `PolygonProvider`.
pub struct ExclusionFilter {
    polygons: Vec<Polygon>,
}

impl ExclusionFilter {
    /// Builds a filter by fetching polygons from `provider`. On failure,
    /// fails open with an empty mask and logs a warning (spec.md §4.4).
    ///
    /// # Arguments
    ///
    /// * 'provider' - external polygon collaborator
    /// * 'center' - request center
    /// * 'radius_km' - request radius
    /// * 'opts' - water/sensitive inclusion flags and requested buffer
    pub fn build(provider: &dyn PolygonProvider, center: Coordinate, radius_km: f64, opts: FetchOptions) -> ExclusionFilter {
        match provider.fetch(center, radius_km, opts) {
            Ok(polygons) => ExclusionFilter { polygons },
            Err(e) => {
                warn!("polygon provider failed, continuing without exclusion: {}", e);
                ExclusionFilter { polygons: Vec::new() }
            }
        }
    }

    /// Returns true if `point` falls inside any excluded polygon.
    pub fn is_excluded(&self, point: Coordinate) -> bool {
        self.polygons.iter().any(|p| polygon_contains(p, point))
    }
}

fn polygon_contains(polygon: &Polygon, point: Coordinate) -> bool {
    match &polygon.geometry {
        Geometry::Polygon { coordinates } => rings_contain(coordinates, point),
        Geometry::MultiPolygon { coordinates } => coordinates.iter().any(|rings| rings_contain(rings, point)),
    }
}

/// `rings[0]` is the outer boundary, `rings[1..]` are holes. A point inside
/// a hole is outside the polygon.
fn rings_contain(rings: &[Ring], point: Coordinate) -> bool {
    let Some(outer) = rings.first() else { return false };
    if !ray_cast_contains(outer, point) {
        return false;
    }
    for hole in &rings[1..] {
        if ray_cast_contains(hole, point) {
            return false;
        }
    }
    true
}

/// Standard ray-casting point-in-polygon test in the `(lng, lat)` plane.
fn ray_cast_contains(ring: &Ring, point: Coordinate) -> bool {
    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        let intersects = ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi);
        if intersects {
            inside = !inside;
        }
        j = i;
    }

    inside
}
