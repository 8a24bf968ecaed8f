use crate::models::{IrradianceTriple, PoaBreakdown, SolarPosition};

/// Solar constant, W/m^2.
pub const I_SC: f64 = 1367.0;
/// Clear-sky attenuation factor.
pub const K_CLEAR_SKY: f64 = 0.75;
/// Diffuse fraction of beam irradiance.
pub const F_DIFFUSE: f64 = 0.15;
/// Ground albedo.
pub const ALBEDO: f64 = 0.2;

/// Kasten-Young air mass as a function of solar elevation, radians.
/// Elevation must be > 0; callers are expected to have already rejected
/// night-time positions.
fn air_mass(elevation_rad: f64) -> f64 {
    let elevation_deg = elevation_rad.to_degrees();
    1.0 / (elevation_rad.sin() + 0.50572 * (elevation_deg + 6.07995).powf(-1.6364))
}

/// Clear-sky DNI/DHI/GHI for a given solar elevation, per spec.md §4.6.
/// DNI never includes the panel incidence cosine — that belongs solely to
/// the beam term of `plane_of_array`.
///
/// # Arguments
///
/// * 'elevation_rad' - solar elevation, radians
pub fn clear_sky_irradiance(elevation_rad: f64) -> IrradianceTriple {
    if elevation_rad <= 0.0 {
        return IrradianceTriple::default();
    }

    let m = air_mass(elevation_rad);
    let tau = 0.7f64.powf(m.powf(0.678));

    let dni = I_SC * tau * K_CLEAR_SKY;
    let dhi = dni * elevation_rad.sin() * F_DIFFUSE;
    let ghi = dni * elevation_rad.sin() + dhi;

    debug_assert!((ghi - (dni * elevation_rad.sin() + dhi)).abs() < 10.0);

    IrradianceTriple { dni, dhi, ghi }
}

/// Decomposes clear-sky irradiance onto a tilted panel: beam + isotropic
/// diffuse + ground-reflected, per spec.md §4.6.
///
/// # Arguments
///
/// * 'irr' - DNI/DHI/GHI triple for the current sun position
/// * 'sun' - current solar position
/// * 'tilt_deg' - panel tilt from horizontal, degrees
/// * 'surface_azimuth_deg' - panel surface azimuth, same convention as solar azimuth
pub fn plane_of_array(irr: IrradianceTriple, sun: SolarPosition, tilt_deg: f64, surface_azimuth_deg: f64) -> PoaBreakdown {
    if sun.elevation <= 0.0 {
        return PoaBreakdown::default();
    }

    let beta = tilt_deg.to_radians();
    let gamma = surface_azimuth_deg.to_radians();

    let cos_aoi = sun.elevation.sin() * beta.cos() + sun.elevation.cos() * beta.sin() * (sun.azimuth - gamma).cos();

    let beam = irr.dni * cos_aoi.max(0.0);
    let diffuse = irr.dhi * (1.0 + beta.cos()) / 2.0;
    let ground = irr.ghi * ALBEDO * (1.0 - beta.cos()) / 2.0;

    PoaBreakdown { beam, diffuse, ground }
}
