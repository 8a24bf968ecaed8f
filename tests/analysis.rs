use solar_potential_engine::config::Config;
use solar_potential_engine::{CancellationToken, Coordinate, Engine, ExclusionConfig, SearchRequest};

fn engine_with_k(k: usize) -> Engine {
    let mut cfg = Config::default();
    cfg.ranking.default_k = k;
    cfg.sampling.min_candidates = 200;
    cfg.sampling.max_candidates = 2000;
    Engine::new(cfg).unwrap()
}

fn pairwise_distances_km(lats_lngs: &[(f64, f64)]) -> Vec<f64> {
    let mut out = Vec::new();
    for i in 0..lats_lngs.len() {
        for j in (i + 1)..lats_lngs.len() {
            let a = Coordinate::new(lats_lngs[i].0, lats_lngs[i].1);
            let b = Coordinate::new(lats_lngs[j].0, lats_lngs[j].1);
            out.push(solar_potential_engine::geo::haversine_km(a, b));
        }
    }
    out
}

/// E1: a 2km-radius request around Austin returns 5 well-spread,
/// finite-scoring results, each within range of center.
#[test]
fn e1_austin_request_returns_five_spaced_results() {
    let engine = engine_with_k(5);
    let request = SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 2.0,
        urban_penalty: false,
        include_land_prices: true,
        rank_by_cost: true,
        exclusion: None,
        seed_salt: Some(0),
    };

    let token = CancellationToken::new();
    let results = engine.analyze(&request, &token, |_| {}).unwrap();

    assert_eq!(results.len(), 5);
    for r in &results {
        assert!(r.score.is_finite());
        let d = pairwise_distances_km(&[(r.lat, r.lng), (request.center.lat, request.center.lng)])[0];
        assert!(d <= 2.05, "result {} km from center, expected <= 2km (plus slack)", d);
    }

    let coords: Vec<(f64, f64)> = results.iter().map(|r| (r.lat, r.lng)).collect();
    for d in pairwise_distances_km(&coords) {
        assert!(d * 1000.0 >= 500.0 - 1e-6, "results closer than 500m: {}m", d * 1000.0);
    }
}

/// E2: a tighter 0.5km request returns between 1 and 5 results, all within
/// the smaller radius.
#[test]
fn e2_tight_radius_returns_fewer_results_within_radius() {
    let engine = engine_with_k(5);
    let request = SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 0.5,
        urban_penalty: false,
        include_land_prices: true,
        rank_by_cost: true,
        exclusion: None,
        seed_salt: Some(0),
    };

    let token = CancellationToken::new();
    let results = engine.analyze(&request, &token, |_| {}).unwrap();

    assert!(!results.is_empty() && results.len() <= 5);
    for r in &results {
        let d = pairwise_distances_km(&[(r.lat, r.lng), (request.center.lat, request.center.lng)])[0];
        assert!(d <= 0.55, "result {} km from center, expected <= 0.5km (plus slack)", d);
    }
}

/// E3: without land pricing, results carry a score (RPS) but omit the
/// optional cost fields.
#[test]
fn e3_no_land_prices_omits_cost_fields() {
    let engine = engine_with_k(10);
    let request = SearchRequest {
        center: Coordinate::new(40.0, -74.0),
        radius_km: 1.0,
        urban_penalty: false,
        include_land_prices: false,
        rank_by_cost: false,
        exclusion: None,
        seed_salt: None,
    };

    let token = CancellationToken::new();
    let results = engine.analyze(&request, &token, |_| {}).unwrap();

    assert!(!results.is_empty());
    for r in &results {
        assert!(r.land_price_usd_per_m2.is_none());
        assert!(r.power_per_cost.is_none());
    }
}

/// E4: re-running the same request in the same process produces bit-identical results.
#[test]
fn e4_repeated_run_is_bit_identical() {
    let engine = engine_with_k(5);
    let request = SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 2.0,
        urban_penalty: true,
        include_land_prices: true,
        rank_by_cost: false,
        exclusion: None,
        seed_salt: Some(42),
    };

    let token = CancellationToken::new();
    let first = engine.analyze(&request, &token, |_| {}).unwrap();
    let second = engine.analyze(&request, &token, |_| {}).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.rank, b.rank);
        assert_eq!(a.lat.to_bits(), b.lat.to_bits());
        assert_eq!(a.lng.to_bits(), b.lng.to_bits());
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.kwh_per_day.to_bits(), b.kwh_per_day.to_bits());
    }
}

/// E5: latitude-band bias correction sanity across three independent
/// requests at identical radius but different latitude.
#[test]
fn e5_latitude_band_rps_is_not_ordered_like_raw_poa() {
    let engine = engine_with_k(1);
    let lats = [20.0, 40.0, 60.0];

    let mut top_scores = Vec::new();
    for &lat in &lats {
        let request = SearchRequest {
            center: Coordinate::new(lat, 0.0),
            radius_km: 1.0,
            urban_penalty: false,
            include_land_prices: false,
            rank_by_cost: false,
            exclusion: None,
            seed_salt: Some(0),
        };
        let token = CancellationToken::new();
        let results = engine.analyze(&request, &token, |_| {}).unwrap();
        top_scores.push(results[0].score);
    }

    let max_score = top_scores.iter().cloned().fold(0.0f64, f64::max);
    let min_score = top_scores.iter().cloned().fold(f64::MAX, f64::min);
    assert!(min_score > 0.0);
    assert!(max_score / min_score <= 2.0, "top RPS across latitude bands spans more than a factor of 2: {:?}", top_scores);
}

/// E6: cancelling before the pipeline starts returns `Cancelled` with no results.
#[test]
fn e6_cancellation_returns_cleanly() {
    let engine = engine_with_k(5);
    let request = SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 2.0,
        urban_penalty: false,
        include_land_prices: false,
        rank_by_cost: false,
        exclusion: None,
        seed_salt: None,
    };

    let token = CancellationToken::new();
    token.cancel();
    let result = engine.analyze(&request, &token, |_| {});
    assert!(result.is_err());
}

/// Exclusion: a caller-disabled exclusion config is a no-op even when set.
#[test]
fn exclusion_disabled_config_has_no_effect() {
    let engine = engine_with_k(5);
    let request = SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 2.0,
        urban_penalty: false,
        include_land_prices: false,
        rank_by_cost: false,
        exclusion: Some(ExclusionConfig { enabled: false, buffer_m: 0, include_water: false, include_sensitive: false }),
        seed_salt: Some(0),
    };

    let token = CancellationToken::new();
    let results = engine.analyze(&request, &token, |_| {}).unwrap();
    assert!(!results.is_empty());
}
