use std::f64::consts::PI;

use crate::models::SolarPosition;

/// Day of year, 1-366, for a Gregorian month/day pair (month 1-indexed,
/// non-leap-year table; good enough for the representative-date use here).
///
/// # Arguments
///
/// * 'month' - 1-12
/// * 'day' - day of month
pub fn day_of_year(month: u32, day: u32) -> u32 {
    const CUMULATIVE: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    CUMULATIVE[(month - 1) as usize] + day
}

/// Solar declination in radians, per spec.md §4.5.
///
/// # Arguments
///
/// * 'n' - day of year, 1-366
pub fn declination_rad(n: u32) -> f64 {
    let deg = 23.45 * (((360.0 / 365.0) * (284.0 + n as f64)).to_radians()).sin();
    deg.to_radians()
}

/// Equation of time, in minutes, per spec.md §4.5.
///
/// # Arguments
///
/// * 'n' - day of year, 1-366
pub fn equation_of_time_min(n: u32) -> f64 {
    let b = ((360.0 / 365.0) * (n as f64 - 81.0)).to_radians();
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Local Apparent Solar Time, in hours, at longitude `lng_deg` for the given
/// UTC hour and equation-of-time offset. This folds the longitude and the
/// equation of time into the conversion from UTC to apparent solar time, so
/// no timezone database is required (see SPEC_FULL.md §9).
///
/// # Arguments
///
/// * 'utc_hour' - UTC hour of day, may be fractional, in [0, 24)
/// * 'lng_deg' - longitude, degrees
/// * 'eot_min' - equation of time, minutes
pub fn local_apparent_solar_time_hours(utc_hour: f64, lng_deg: f64, eot_min: f64) -> f64 {
    utc_hour + lng_deg / 15.0 + eot_min / 60.0
}

/// Hour angle in radians from Local Apparent Solar Time.
pub fn hour_angle_rad(last_hours: f64) -> f64 {
    ((last_hours - 12.0) * 15.0).to_radians()
}

/// Solar elevation and azimuth (0 = North, clockwise), both in radians.
///
/// # Arguments
///
/// * 'lat_deg' - latitude, degrees
/// * 'declination_rad' - solar declination, radians
/// * 'hour_angle_rad' - hour angle, radians
pub fn solar_position(lat_deg: f64, declination_rad: f64, hour_angle_rad: f64) -> SolarPosition {
    let phi = lat_deg.to_radians();
    let delta = declination_rad;
    let h = hour_angle_rad;

    let sin_elev = delta.sin() * phi.sin() + delta.cos() * phi.cos() * h.cos();
    let elevation = sin_elev.clamp(-1.0, 1.0).asin();

    let azimuth_raw = h.sin().atan2(h.cos() * phi.sin() - delta.tan() * phi.cos());
    let azimuth = wrap_to_pi(azimuth_raw);

    debug_assert!(elevation >= -PI / 2.0 - 1e-9 && elevation <= PI / 2.0 + 1e-9);
    debug_assert!(azimuth > -PI - 1e-9 && azimuth <= PI + 1e-9);

    SolarPosition { elevation, azimuth }
}

/// Wraps an angle in radians to `(-pi, pi]`.
fn wrap_to_pi(angle: f64) -> f64 {
    let mut a = angle;
    while a <= -PI {
        a += 2.0 * PI;
    }
    while a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// UTC hour of solar noon at longitude `lng_deg` given the equation of time.
///
/// # Arguments
///
/// * 'lng_deg' - longitude, degrees
/// * 'eot_min' - equation of time, minutes
pub fn solar_noon_utc_hour(lng_deg: f64, eot_min: f64) -> f64 {
    12.0 - lng_deg / 15.0 - eot_min / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_stays_within_valid_range() {
        for lat in [-89.0, -45.0, 0.0, 45.0, 89.0] {
            for h in 0..48 {
                let n = day_of_year(6, 21);
                let delta = declination_rad(n);
                let ha = hour_angle_rad(h as f64 * 0.5);
                let sp = solar_position(lat, delta, ha);
                assert!(sp.elevation >= -PI / 2.0 - 1e-9 && sp.elevation <= PI / 2.0 + 1e-9);
            }
        }
    }

    #[test]
    fn azimuth_is_continuous_across_wrap() {
        let n = day_of_year(6, 21);
        let delta = declination_rad(n);
        let lat = 40.0;

        let mut prev: Option<f64> = None;
        // Sweep hour angle across a full day in small steps; azimuth should
        // never jump by more than a small epsilon between adjacent samples,
        // once the cos(AOI)-relevant quantity (sin/cos of azimuth) is compared
        // rather than the raw wrapped value at the -pi/pi seam.
        for i in -720..720 {
            let last = 12.0 + (i as f64) / 60.0;
            let ha = hour_angle_rad(last);
            let sp = solar_position(lat, delta, ha);
            if let Some(prev_az) = prev {
                let d = (sp.azimuth.sin() - prev_az.sin()).abs() + (sp.azimuth.cos() - prev_az.cos()).abs();
                assert!(d < 0.05, "azimuth discontinuity at step {}: {} vs {}", i, sp.azimuth, prev_az);
            }
            prev = Some(sp.azimuth);
        }
    }

    #[test]
    fn solar_noon_at_greenwich_is_near_twelve_when_eot_is_zero() {
        assert!((solar_noon_utc_hour(0.0, 0.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn day_of_year_matches_known_dates() {
        assert_eq!(day_of_year(1, 1), 1);
        assert_eq!(day_of_year(6, 21), 172);
        assert_eq!(day_of_year(12, 31), 365);
    }
}
