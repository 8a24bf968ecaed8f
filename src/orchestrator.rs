use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::bias_corrector::{baseline_poa, clear_sky_index, corrected_poa, fit_affine, local_percentiles, relative_potential_score, sample_reference_ring};
use crate::config::Config;
use crate::daily_integrator::{current_year, integrate_day, poa_to_kwh_per_day};
use crate::errors::AnalysisError;
use crate::exclusion::models::FetchOptions;
use crate::exclusion::{ExclusionFilter, HttpPolygonProvider, NoOpPolygonProvider, PolygonProvider};
use crate::land_price::{HttpLandPriceProvider, LandPriceCache, LandPriceProvider, SyntheticLandPriceProvider};
use crate::models::{Candidate, Coordinate, ProgressEvent, ResultItem, ScoredCandidate, SearchRequest, Stage};
use crate::rng::SeededRng;
use crate::sampler::{sample_disk, target_count};
use crate::topk::select_top_k;

/// Co-operative cancellation flag, checked between pipeline stages and
/// during the per-point parallel loop (spec.md §5, scheduling model).
#[derive(Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the engine's two long-lived caches (exclusion polygon fetches are
/// not cached across requests, only land prices are, per spec.md §9's
/// "shared resources" note) plus the wired-in provider collaborators.
pub struct Engine {
    config: Config,
    polygon_provider: Box<dyn PolygonProvider + Send + Sync>,
    land_price_provider: Option<Box<dyn LandPriceProvider + Send + Sync>>,
    land_price_fallback: SyntheticLandPriceProvider,
    land_price_cache: LandPriceCache,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self, AnalysisError> {
        let polygon_provider: Box<dyn PolygonProvider + Send + Sync> = match &config.providers.polygon_endpoint {
            Some(endpoint) => Box::new(HttpPolygonProvider::new(endpoint.clone(), config.providers.polygon_timeout_secs)),
            None => Box::new(NoOpPolygonProvider),
        };

        let land_price_provider: Option<Box<dyn LandPriceProvider + Send + Sync>> = match &config.providers.land_price_endpoint {
            Some(endpoint) => Some(Box::new(
                HttpLandPriceProvider::new(endpoint.clone(), config.providers.land_price_api_key.clone(), config.providers.land_price_timeout_secs)
                    .map_err(|e| AnalysisError::Internal(format!("failed to build land price client: {}", e)))?,
            )),
            None => None,
        };

        let land_price_fallback = SyntheticLandPriceProvider::new(config.land_price.clone());
        let land_price_cache = LandPriceCache::new(Duration::from_secs(config.land_price.cache_ttl_secs));

        Ok(Engine { config, polygon_provider, land_price_provider, land_price_fallback, land_price_cache })
    }

    /// Runs one full analysis pipeline: grid generation, optional exclusion,
    /// per-point irradiance integration, bias correction, optional land
    /// pricing, and top-K ranking (spec.md §5, Orchestrator state machine).
    ///
    /// # Arguments
    ///
    /// * 'request' - validated search parameters
    /// * 'token' - co-operative cancellation flag
    /// * 'on_progress' - callback invoked at each stage boundary
    pub fn analyze(
        &self,
        request: &SearchRequest,
        token: &CancellationToken,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<Vec<ResultItem>, AnalysisError> {
        request.validate().map_err(AnalysisError::InvalidRequest)?;

        on_progress(ProgressEvent::new(0, Stage::GridGeneration, "sampling candidate grid"));
        info!("starting analysis for center=({}, {}) radius_km={}", request.center.lat, request.center.lng, request.radius_km);

        let salt = request.seed_salt.unwrap_or(0);
        let mut rng = SeededRng::from_seed(request.center.lat, request.center.lng, request.radius_km, salt);

        let n = target_count(request.radius_km, &self.config.sampling);
        let points = sample_disk(request.center, request.radius_km, n, &mut rng);
        debug!("sampled {} candidate points", points.len());

        self.check_cancelled(token)?;

        let points = self.apply_exclusion(request, points);
        if points.is_empty() {
            warn!("no candidates remain after exclusion");
            on_progress(ProgressEvent::new(100, Stage::Complete, "no candidates remain"));
            return Ok(Vec::new());
        }

        on_progress(ProgressEvent::new(25, Stage::IrradianceComputation, "integrating daily irradiance"));
        self.check_cancelled(token)?;

        let year = current_year();
        let raw_poas: Vec<f64> = points.par_iter().map(|&loc| integrate_day(loc, year, request.urban_penalty)).collect();

        self.check_cancelled(token)?;

        on_progress(ProgressEvent::new(50, Stage::BiasCorrection, "correcting against climatology baseline"));
        let scored = self.bias_correct(request, &points, &raw_poas, &mut rng, year);

        self.check_cancelled(token)?;

        let scored = if request.include_land_prices {
            on_progress(ProgressEvent::new(70, Stage::LandPrices, "pricing land"));
            self.attach_land_prices(scored, request.rank_by_cost)
        } else {
            scored
        };

        self.check_cancelled(token)?;

        on_progress(ProgressEvent::new(90, Stage::Ranking, "ranking candidates"));
        let k = self.config.ranking.default_k.min(scored.len());
        let results = select_top_k(&scored, k, request.center, request.rank_by_cost, &self.config.ranking);

        on_progress(ProgressEvent::new(100, Stage::Complete, "analysis complete"));
        info!("analysis complete: {} results", results.len());

        Ok(results)
    }

    fn check_cancelled(&self, token: &CancellationToken) -> Result<(), AnalysisError> {
        if token.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn apply_exclusion(&self, request: &SearchRequest, points: Vec<Coordinate>) -> Vec<Coordinate> {
        let Some(exclusion) = &request.exclusion else {
            return points;
        };
        if !exclusion.enabled {
            return points;
        }

        let opts = FetchOptions { include_water: exclusion.include_water, include_sensitive: exclusion.include_sensitive, buffer_m: exclusion.buffer_m };
        let filter = ExclusionFilter::build(self.polygon_provider.as_ref(), request.center, request.radius_km, opts);
        points.into_iter().filter(|p| !filter.is_excluded(*p)).collect()
    }

    fn bias_correct(&self, request: &SearchRequest, points: &[Coordinate], raw_poas: &[f64], rng: &mut SeededRng, year: i32) -> Vec<ScoredCandidate> {
        let climatology = &self.config.climatology;

        let ring = sample_reference_ring(request.center, rng, &self.config.ranking);
        let model_samples: Vec<f64> = ring.iter().map(|&p| integrate_day(p, year, request.urban_penalty)).collect();
        let baseline_samples: Vec<f64> = ring.iter().map(|&p| baseline_poa(p, year, climatology)).collect();
        let fit = fit_affine(&model_samples, &baseline_samples);

        let corrected: Vec<f64> = raw_poas.iter().map(|&raw| corrected_poa(raw, fit)).collect();
        let percentiles = local_percentiles(&corrected);

        points
            .iter()
            .zip(raw_poas.iter())
            .zip(corrected.iter())
            .zip(percentiles.iter())
            .map(|(((&loc, &raw), &corr), &pct)| {
                let baseline = baseline_poa(loc, year, climatology);
                let csi = clear_sky_index(corr, baseline);
                let rps = relative_potential_score(csi, pct, &self.config.ranking);
                let kwh_per_day = poa_to_kwh_per_day(corr, self.config.general.panel_efficiency);

                ScoredCandidate {
                    candidate: Candidate { loc, raw_poa: raw },
                    kwh_per_day,
                    baseline,
                    corrected_poa: corr,
                    csi,
                    local_pct: pct,
                    rps,
                    land_price: None,
                    power_per_cost: None,
                }
            })
            .collect()
    }

    fn attach_land_prices(&self, candidates: Vec<ScoredCandidate>, rank_by_cost: bool) -> Vec<ScoredCandidate> {
        candidates
            .into_iter()
            .map(|mut c| {
                let estimate =
                    self.land_price_cache
                        .get_or_fetch(c.candidate.loc, self.land_price_provider.as_deref(), &self.land_price_fallback);
                if rank_by_cost {
                    c.power_per_cost = Some(c.kwh_per_day / estimate.price_usd_per_m2.max(1.0));
                }
                c.land_price = Some(estimate);
                c
            })
            .collect()
    }
}
