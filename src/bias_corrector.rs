use crate::config::{Climatology, Ranking};
use crate::daily_integrator::solar_noon_poa;
use crate::geo::project_polar;
use crate::models::{BiasFit, Coordinate};
use crate::rng::SeededRng;

/// Baseline POA at `loc` for the representative date: a solar-noon POA
/// attenuated by the month-indexed climatology table and derated for
/// ambient temperature. Applied once, here, never in the daily integrator
/// (spec.md §4.8, §9 double-counting note).
///
/// # Arguments
///
/// * 'loc' - site coordinate
/// * 'year' - calendar year used to pick the representative date
/// * 'climatology' - month-indexed attenuation/temperature tables
pub fn baseline_poa(loc: Coordinate, year: i32, climatology: &Climatology) -> f64 {
    const REPRESENTATIVE_MONTH_INDEX: usize = 5; // June, 0-indexed

    let noon_poa = solar_noon_poa(loc, year);
    let attenuation = climatology.attenuation[REPRESENTATIVE_MONTH_INDEX];
    let ambient_temp = climatology.ambient_temp_c[REPRESENTATIVE_MONTH_INDEX];
    let temp_derate = (1.0 - 0.004 * (ambient_temp - 25.0)).max(0.5);

    noon_poa * attenuation * temp_derate
}

/// Samples `ranking.reference_ring_points` around `center` on a ring of
/// radius `ranking.reference_ring_radius_km`, angles evenly spaced with
/// small radial jitter from `rng` (spec.md §4.8).
///
/// # Arguments
///
/// * 'center' - request center
/// * 'rng' - seeded RNG shared with the candidate sampler's seed stream
/// * 'ranking' - configured ring radius and point count
pub fn sample_reference_ring(center: Coordinate, rng: &mut SeededRng, ranking: &Ranking) -> Vec<Coordinate> {
    let n = ranking.reference_ring_points;
    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
            let jitter = 1.0 + (rng.next_f64() - 0.5) * 0.1;
            project_polar(center, ranking.reference_ring_radius_km * jitter, theta)
        })
        .collect()
}

/// Least-squares affine fit `baseline ~= slope * model + intercept` over
/// paired (model, baseline) POA samples, plus Pearson correlation. Degrades
/// to the identity fit when `|corr| < 0.3` (spec.md §4.8).
///
/// # Arguments
///
/// * 'model' - raw model POA at each reference point
/// * 'baseline' - climatology baseline POA at each reference point
pub fn fit_affine(model: &[f64], baseline: &[f64]) -> BiasFit {
    assert_eq!(model.len(), baseline.len());
    let n = model.len() as f64;
    if n < 2.0 {
        return BiasFit { slope: 1.0, intercept: 0.0, correlation: 0.0 };
    }

    let mean_x = model.iter().sum::<f64>() / n;
    let mean_y = baseline.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..model.len() {
        let dx = model[i] - mean_x;
        let dy = baseline[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return BiasFit { slope: 1.0, intercept: 0.0, correlation: 0.0 };
    }

    let slope = cov / var_x;
    let intercept = mean_y - slope * mean_x;
    let correlation = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);

    if correlation.abs() < 0.3 {
        BiasFit { slope: 1.0, intercept: 0.0, correlation }
    } else {
        BiasFit { slope, intercept, correlation }
    }
}

/// Applies the affine fit to a raw model POA, floored at zero (spec.md §4.8).
pub fn corrected_poa(raw_poa: f64, fit: BiasFit) -> f64 {
    (fit.slope * raw_poa + fit.intercept).max(0.0)
}

/// Clear-sky index: ratio of corrected model POA to baseline POA, clamped
/// to `[0, 2]`, defined as 0 if baseline is non-positive (spec.md §4.8).
pub fn clear_sky_index(corrected: f64, baseline: f64) -> f64 {
    if baseline <= 0.0 {
        0.0
    } else {
        (corrected / baseline).clamp(0.0, 2.0)
    }
}

/// Assigns each value in `values` a local percentile `100 * rank / (n - 1)`
/// (0 for a single-element input), preserving the original input order in
/// the returned vector (spec.md §4.8).
pub fn local_percentiles(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n <= 1 {
        return vec![0.0; n];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap());

    let mut percentiles = vec![0.0; n];
    for (rank, &idx) in order.iter().enumerate() {
        percentiles[idx] = 100.0 * (rank as f64) / ((n - 1) as f64);
    }
    percentiles
}

/// Relative Potential Score: weighted combination of CSI and local
/// percentile, default weights `(0.6, 0.4)` (spec.md §4.8).
///
/// # Arguments
///
/// * 'csi' - clear-sky index, expected in `[0, 2]`
/// * 'percentile' - local percentile, expected in `[0, 100]`
/// * 'ranking' - configured weights
pub fn relative_potential_score(csi: f64, percentile: f64, ranking: &Ranking) -> f64 {
    ranking.w_csi * csi + ranking.w_percentile * (percentile / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn fit_degrades_to_identity_for_weak_correlation() {
        // Constant baseline regardless of model value: zero variance in y,
        // correlation is undefined/weak, fit must degrade to identity.
        let model = vec![100.0, 200.0, 300.0, 400.0];
        let baseline = vec![50.0, 50.0, 50.0, 50.0];
        let fit = fit_affine(&model, &baseline);
        assert_eq!(fit.slope, 1.0);
        assert_eq!(fit.intercept, 0.0);
    }

    #[test]
    fn fit_recovers_known_linear_relationship() {
        let model = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let baseline: Vec<f64> = model.iter().map(|m| 2.0 * m + 5.0).collect();
        let fit = fit_affine(&model, &baseline);
        assert!((fit.slope - 2.0).abs() < 1e-6);
        assert!((fit.intercept - 5.0).abs() < 1e-6);
        assert!(fit.correlation.abs() > 0.99);
    }

    #[test]
    fn clear_sky_index_is_zero_for_non_positive_baseline() {
        assert_eq!(clear_sky_index(500.0, 0.0), 0.0);
        assert_eq!(clear_sky_index(500.0, -10.0), 0.0);
    }

    #[test]
    fn clear_sky_index_is_clamped_to_two() {
        assert_eq!(clear_sky_index(1000.0, 100.0), 2.0);
    }

    #[test]
    fn percentiles_span_zero_to_hundred_for_sorted_input() {
        let values = vec![10.0, 30.0, 20.0, 40.0];
        let pct = local_percentiles(&values);
        assert_eq!(pct[0], 0.0); // 10.0 is the minimum
        assert_eq!(pct[3], 100.0); // 40.0 is the maximum
    }

    #[test]
    fn reference_ring_has_twelve_points_near_two_km() {
        let center = Coordinate::new(30.2672, -97.7431);
        let ranking = Config::default().ranking;
        let mut rng = SeededRng::from_seed(center.lat, center.lng, 2.0, 0);
        let ring = sample_reference_ring(center, &mut rng, &ranking);
        assert_eq!(ring.len(), ranking.reference_ring_points);
        for p in &ring {
            let d = crate::geo::haversine_km(center, *p);
            assert!(d > 1.5 && d < 2.5, "ring point distance out of expected jitter band: {}", d);
        }
    }

    /// Documents the spec's open question: for small request radii, the
    /// fixed 2km reference ring extends outside the requested disk. This
    /// spec adopts that behavior unchanged rather than scaling the ring.
    #[test]
    fn reference_ring_can_exceed_small_request_radius() {
        let center = Coordinate::new(30.2672, -97.7431);
        let request_radius_km = 1.0;
        let ranking = Config::default().ranking;
        let mut rng = SeededRng::from_seed(center.lat, center.lng, request_radius_km, 0);
        let ring = sample_reference_ring(center, &mut rng, &ranking);
        let outside_request = ring.iter().any(|p| crate::geo::haversine_km(center, *p) > request_radius_km);
        assert!(outside_request);
    }

    #[test]
    fn bias_correction_breaks_monotonicity_with_latitude() {
        // Three synthetic latitudes with identical local climate: corrected
        // RPS ranking must not equal raw-POA ranking, since absolute bias
        // (higher raw POA at low latitude) is removed by normalisation.
        let cfg = Config::default();
        let year = 2026;

        let lats = [20.0, 40.0, 60.0];
        let mut raw_poas = Vec::new();
        let mut rps_values = Vec::new();

        for &lat in &lats {
            let loc = Coordinate::new(lat, 0.0);
            let raw = crate::daily_integrator::integrate_day(loc, year, false);
            let baseline = baseline_poa(loc, year, &cfg.climatology);

            let mut rng = SeededRng::from_seed(lat, 0.0, 1.0, 0);
            let ring = sample_reference_ring(loc, &mut rng, &cfg.ranking);
            let model_samples: Vec<f64> = ring.iter().map(|p| crate::daily_integrator::integrate_day(*p, year, false)).collect();
            let baseline_samples: Vec<f64> = ring.iter().map(|p| baseline_poa(*p, year, &cfg.climatology)).collect();
            let fit = fit_affine(&model_samples, &baseline_samples);

            let corrected = corrected_poa(raw, fit);
            let csi = clear_sky_index(corrected, baseline);

            raw_poas.push(raw);
            rps_values.push(csi); // percentile term needs the full candidate set; CSI alone suffices to show non-monotonicity here
        }

        let raw_order = {
            let mut idx = [0usize, 1, 2];
            idx.sort_by(|&a, &b| raw_poas[b].partial_cmp(&raw_poas[a]).unwrap());
            idx
        };
        let rps_order = {
            let mut idx = [0usize, 1, 2];
            idx.sort_by(|&a, &b| rps_values[b].partial_cmp(&rps_values[a]).unwrap());
            idx
        };

        assert!(raw_poas[0] > raw_poas[1] && raw_poas[1] > raw_poas[2], "expected raw POA to decrease with latitude");
        assert_ne!(raw_order, rps_order, "bias correction should break the raw-POA ordering by latitude");
    }
}
