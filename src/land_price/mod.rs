pub mod errors;
pub mod models;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use log::warn;
use md5::{Digest, Md5};

use crate::config::LandPrice as LandPriceConfig;
use crate::geo::haversine_km;
use crate::models::{Coordinate, LandPriceEstimate, LandPriceSource};
use crate::retry;
use crate::wrapper;
use errors::LandPriceError;
use models::ApiPriceResponse;

/// Contract for a land-price collaborator (spec.md §4.9 / §6).
pub trait LandPriceProvider {
    fn price(&self, loc: Coordinate) -> Result<LandPriceEstimate, LandPriceError>;
}

/// Deterministic synthetic price surface. The per-coordinate jitter factor
/// is derived from an MD5 digest of the rounded coordinate rather than from
/// a shared RNG stream, so batch ordering never changes the result for a
/// given point (spec.md §4.9).
pub struct SyntheticLandPriceProvider {
    config: LandPriceConfig,
}

impl SyntheticLandPriceProvider {
    pub fn new(config: LandPriceConfig) -> Self {
        SyntheticLandPriceProvider { config }
    }

    fn nearest_urban_distance_km(&self, loc: Coordinate) -> f64 {
        self.config
            .urban_centers
            .iter()
            .map(|&(lat, lng)| haversine_km(loc, Coordinate::new(lat, lng)))
            .fold(f64::INFINITY, f64::min)
    }
}

impl LandPriceProvider for SyntheticLandPriceProvider {
    fn price(&self, loc: Coordinate) -> Result<LandPriceEstimate, LandPriceError> {
        let d_urban = self.nearest_urban_distance_km(loc);
        let urban_term = (1.0 - (d_urban * self.config.urban_gradient).min(0.8)).max(0.2);
        let lat_term = 1.0 + (loc.lat - 40.0).abs() * self.config.lat_gradient;
        let lng_term = 1.0 + loc.lng.abs() * self.config.lng_gradient;

        let jitter = coordinate_jitter(loc);

        let price = (self.config.base_usd_per_m2 * urban_term * lat_term * lng_term * jitter).max(self.config.floor_usd_per_m2);

        Ok(LandPriceEstimate { price_usd_per_m2: price, source: LandPriceSource::Synthetic, confidence: 0.6 })
    }
}

/// Derives a stable pseudo-random factor in `[0.8, 1.2]` from the
/// coordinate, rounded to 4 decimal places to match the cache key
/// granularity, via an MD5 digest. Coordinate-addressable, not drawn from a
/// shared RNG stream.
fn coordinate_jitter(loc: Coordinate) -> f64 {
    let key = cache_key(loc);
    let mut hasher = Md5::new();
    hasher.update(format!("{}:{}", key.0, key.1).as_bytes());
    let digest = hasher.finalize();

    let bytes: [u8; 4] = [digest[0], digest[1], digest[2], digest[3]];
    let as_u32 = u32::from_be_bytes(bytes);
    let unit = (as_u32 as f64) / (u32::MAX as f64);

    0.8 + unit * 0.4
}

/// Rounds a coordinate to 4 decimal places for cache-key / jitter purposes.
fn cache_key(loc: Coordinate) -> (i64, i64) {
    ((loc.lat * 1e4).round() as i64, (loc.lng * 1e4).round() as i64)
}

/// Fetches prices from an external API, mirroring `manager_forecast`'s use
/// of `reqwest::blocking::Client` for an external data source.
pub struct HttpLandPriceProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpLandPriceProvider {
    pub fn new(endpoint: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self, LandPriceError> {
        let client = reqwest::blocking::Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(HttpLandPriceProvider { client, endpoint, api_key })
    }
}

impl LandPriceProvider for HttpLandPriceProvider {
    fn price(&self, loc: Coordinate) -> Result<LandPriceEstimate, LandPriceError> {
        let call = || -> Result<LandPriceEstimate, LandPriceError> {
            let mut req = self.client.get(&self.endpoint).query(&[("lat", loc.lat), ("lng", loc.lng)]);
            if let Some(key) = &self.api_key {
                req = req.header("Authorization", format!("Bearer {}", key));
            }

            let response = req.send()?;
            let parsed: ApiPriceResponse = response.json()?;

            Ok(LandPriceEstimate {
                price_usd_per_m2: parsed.price_usd_per_m2,
                source: LandPriceSource::Api,
                confidence: parsed.confidence,
            })
        };

        retry!(call)
    }
}

struct CacheEntry {
    estimate: LandPriceEstimate,
    inserted_at: Instant,
}

/// Single-writer / multiple-reader cache of land-price lookups, keyed by
/// coordinate rounded to 4 decimal places (spec.md §4.9).
pub struct LandPriceCache {
    entries: RwLock<HashMap<(i64, i64), CacheEntry>>,
    ttl: Duration,
}

impl LandPriceCache {
    pub fn new(ttl: Duration) -> Self {
        LandPriceCache { entries: RwLock::new(HashMap::new()), ttl }
    }

    /// Looks up `loc` in the cache; on a miss or expiry, calls `provider`,
    /// falling back to `fallback` (the synthetic surface, with reduced
    /// confidence) if the provider errors, per spec.md §4.9/§6.
    pub fn get_or_fetch(
        &self,
        loc: Coordinate,
        provider: Option<&dyn LandPriceProvider>,
        fallback: &dyn LandPriceProvider,
    ) -> LandPriceEstimate {
        let key = cache_key(loc);

        if let Some(hit) = self.cached(key) {
            return hit;
        }

        let estimate = match provider {
            Some(p) => match p.price(loc) {
                Ok(mut est) => {
                    est.source = LandPriceSource::Api;
                    est
                }
                Err(e) => {
                    warn!("land price provider failed for {:?}, falling back to synthetic: {}", loc, e);
                    let mut est = fallback.price(loc).expect("synthetic provider never fails");
                    est.confidence = est.confidence.min(0.3);
                    est
                }
            },
            None => fallback.price(loc).expect("synthetic provider never fails"),
        };

        self.insert(key, estimate.clone());
        estimate
    }

    fn cached(&self, key: (i64, i64)) -> Option<LandPriceEstimate> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            let mut cached = entry.estimate.clone();
            cached.source = LandPriceSource::Cached;
            Some(cached)
        } else {
            None
        }
    }

    fn insert(&self, key: (i64, i64), estimate: LandPriceEstimate) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, CacheEntry { estimate, inserted_at: Instant::now() });
        }
    }
}
