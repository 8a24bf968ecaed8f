use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate. Degrees, not radians, at every API boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat >= -90.0 && self.lat <= 90.0 && self.lng > -180.0 && self.lng <= 180.0
    }
}

/// Exclusion-mask request options, forwarded to the external polygon provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionConfig {
    pub enabled: bool,
    #[serde(default)]
    pub buffer_m: i64,
    #[serde(default)]
    pub include_water: bool,
    #[serde(default)]
    pub include_sensitive: bool,
}

/// A request for one analysis run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub center: Coordinate,
    pub radius_km: f64,
    #[serde(default)]
    pub urban_penalty: bool,
    #[serde(default)]
    pub include_land_prices: bool,
    #[serde(default)]
    pub rank_by_cost: bool,
    #[serde(default)]
    pub exclusion: Option<ExclusionConfig>,
    #[serde(default)]
    pub seed_salt: Option<i64>,
}

impl SearchRequest {
    /// Validates the request per spec.md §4.11: radius in (0, 100] and
    /// lat/lng within their valid ranges. Returns a human-readable reason
    /// on failure, suitable for wrapping in `AnalysisError::InvalidRequest`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.center.is_valid() {
            return Err(format!("center coordinate out of range: {:?}", self.center));
        }
        if !(self.radius_km > 0.0 && self.radius_km <= 100.0) {
            return Err(format!("radius_km must be in (0, 100], got {}", self.radius_km));
        }
        Ok(())
    }
}

/// A sampled point with its raw (uncorrected) daily POA integral.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub loc: Coordinate,
    pub raw_poa: f64,
}

/// Sun position at a specific (location, time), in radians.
#[derive(Clone, Copy, Debug)]
pub struct SolarPosition {
    pub elevation: f64,
    pub azimuth: f64,
}

/// DNI/DHI/GHI triple in W/m^2.
#[derive(Clone, Copy, Debug, Default)]
pub struct IrradianceTriple {
    pub dni: f64,
    pub dhi: f64,
    pub ghi: f64,
}

/// Plane-of-array decomposition in W/m^2.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoaBreakdown {
    pub beam: f64,
    pub diffuse: f64,
    pub ground: f64,
}

impl PoaBreakdown {
    pub fn total(&self) -> f64 {
        self.beam + self.diffuse + self.ground
    }
}

/// Result of the affine baseline fit over the reference ring.
#[derive(Clone, Copy, Debug)]
pub struct BiasFit {
    pub slope: f64,
    pub intercept: f64,
    pub correlation: f64,
}

/// Land price estimate for one coordinate.
#[derive(Clone, Debug, PartialEq)]
pub enum LandPriceSource {
    Api,
    Synthetic,
    Cached,
}

#[derive(Clone, Debug)]
pub struct LandPriceEstimate {
    pub price_usd_per_m2: f64,
    pub source: LandPriceSource,
    pub confidence: f64,
}

/// A candidate enriched with bias-corrected score and (optionally) land price.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub kwh_per_day: f64,
    pub baseline: f64,
    pub corrected_poa: f64,
    pub csi: f64,
    pub local_pct: f64,
    pub rps: f64,
    pub land_price: Option<LandPriceEstimate>,
    pub power_per_cost: Option<f64>,
}

/// One entry of the final ranked output.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub rank: usize,
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
    pub kwh_per_day: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_price_usd_per_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_per_cost: Option<f64>,
}

/// Orchestrator pipeline stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Idle,
    GridGeneration,
    Exclusion,
    IrradianceComputation,
    BiasCorrection,
    LandPrices,
    Ranking,
    Complete,
}

/// A progress event emitted during `analyze`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub stage: Stage,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(percent: u8, stage: Stage, message: impl Into<String>) -> Self {
        ProgressEvent { percent: percent.min(100), stage, message: message.into() }
    }
}
