use chrono::Datelike;

use crate::irradiance::{clear_sky_irradiance, plane_of_array};
use crate::models::Coordinate;
use crate::solar_geometry::{
    day_of_year, declination_rad, equation_of_time_min, hour_angle_rad, local_apparent_solar_time_hours, solar_position,
};

/// Number of 5-minute steps in a day.
const STEPS_PER_DAY: usize = 288;
const STEP_MINUTES: f64 = 5.0;

/// Returns the day-of-year for the representative date (summer solstice,
/// June 21, of the given calendar year), per spec.md §4.7.
pub fn representative_day_of_year(year: i32) -> u32 {
    let _ = year; // the month/day pair is fixed; year only matters for leap-day tables we don't use
    day_of_year(6, 21)
}

/// Panel tilt (degrees from horizontal) and surface azimuth (degrees, solar
/// azimuth convention) for a site at `lat_deg`, per spec.md §4.7.
pub fn panel_geometry(lat_deg: f64) -> (f64, f64) {
    let tilt = lat_deg.abs() * 0.76;
    let surface_azimuth = if lat_deg >= 0.0 { 180.0 } else { 0.0 };
    (tilt, surface_azimuth)
}

/// Integrates plane-of-array irradiance over the representative day at
/// `loc`, summing 288 five-minute samples, then applies the urban and
/// sky-view derates. Returns the unnormalised daily POA integral (raw_poa),
/// per spec.md §4.7.
///
/// # Arguments
///
/// * 'loc' - site coordinate
/// * 'year' - calendar year used to pick the representative date
/// * 'urban_penalty' - whether to additionally apply the urban derate
pub fn integrate_day(loc: Coordinate, year: i32, urban_penalty: bool) -> f64 {
    let n = representative_day_of_year(year);
    let delta = declination_rad(n);
    let eot = equation_of_time_min(n);
    let (tilt, surface_azimuth) = panel_geometry(loc.lat);

    let mut sum = 0.0;
    for step in 0..STEPS_PER_DAY {
        let utc_hour = (step as f64 * STEP_MINUTES) / 60.0;
        let last = local_apparent_solar_time_hours(utc_hour, loc.lng, eot);
        let ha = hour_angle_rad(last);
        let sun = solar_position(loc.lat, delta, ha);

        if sun.elevation <= 0.0 {
            continue;
        }

        let irr = clear_sky_irradiance(sun.elevation);
        let poa = plane_of_array(irr, sun, tilt, surface_azimuth);
        sum += poa.total();
    }

    let lat_frac = loc.lat.abs() / 90.0;
    let sky_view_factor = (1.0 - lat_frac * 0.2f64).max(0.8);
    let mut result = sum * sky_view_factor;

    if urban_penalty {
        let urban_factor = (1.0 - lat_frac * 0.3f64).max(0.7);
        result *= urban_factor;
    }

    result
}

/// Converts a corrected POA integral (W·m⁻², summed over `STEPS_PER_DAY`
/// 5-minute steps, per spec.md §4.7's "unnormalised daily integral") into
/// kWh per m² of land per day, at the configured panel efficiency. This is
/// the basis for `ScoredCandidate::kwh_per_day` and, divided by land price
/// ($/m²), for `power_per_cost`.
///
/// # Arguments
///
/// * 'corrected_poa' - bias-corrected POA integral for one candidate
/// * 'panel_efficiency' - configured panel conversion efficiency, e.g. 0.20
pub fn poa_to_kwh_per_day(corrected_poa: f64, panel_efficiency: f64) -> f64 {
    let step_hours = STEP_MINUTES / 60.0;
    corrected_poa * step_hours / 1000.0 * panel_efficiency
}

/// Convenience used by callers that want the calendar year of "now" for the
/// representative date, without pulling a `chrono::Local::now()` call into
/// every site-level computation.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Instantaneous total POA at solar noon of the representative date, used
/// by the bias corrector's baseline and by the longitude-smoothness property
/// test (spec.md §8 property 5).
///
/// # Arguments
///
/// * 'loc' - site coordinate
/// * 'year' - calendar year used to pick the representative date
pub fn solar_noon_poa(loc: Coordinate, year: i32) -> f64 {
    let n = representative_day_of_year(year);
    let delta = declination_rad(n);
    let eot = equation_of_time_min(n);
    let (tilt, surface_azimuth) = panel_geometry(loc.lat);

    let noon_utc_hour = crate::solar_geometry::solar_noon_utc_hour(loc.lng, eot);
    let last = local_apparent_solar_time_hours(noon_utc_hour, loc.lng, eot);
    let ha = hour_angle_rad(last);
    let sun = solar_position(loc.lat, delta, ha);

    if sun.elevation <= 0.0 {
        return 0.0;
    }

    let irr = clear_sky_irradiance(sun.elevation);
    plane_of_array(irr, sun, tilt, surface_azimuth).total()
}
