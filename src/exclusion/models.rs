use serde::Deserialize;

/// Type of an area excluded from candidate consideration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonKind {
    Residential,
    Water,
    Sensitive,
    Commercial,
}

/// A ring of `(lng, lat)` points, outer boundary or a hole, GeoJSON order.
pub type Ring = Vec<(f64, f64)>;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub kind: PolygonKind,
    pub geometry: Geometry,
    #[serde(default)]
    pub buffer_m: f64,
}

/// Options forwarded to the external polygon provider.
#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    pub include_water: bool,
    pub include_sensitive: bool,
    /// Caller-requested buffer, in meters, to grow each returned polygon by
    /// before the point-in-polygon test (spec.md §6's `exclusion.buffer_m`).
    pub buffer_m: i64,
}
