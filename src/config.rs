use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

/// General process configuration: logging destination and verbosity.
#[derive(Deserialize, Clone, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
    pub worker_threads: usize,
    /// Converts a corrected POA integral (W·m⁻², summed over 5-minute steps)
    /// into kWh per m² of land per day: `poa * (5/60) / 1000 * efficiency`.
    pub panel_efficiency: f64,
}

/// Weights for combining clear-sky index and local percentile into the
/// Relative Potential Score, plus the top-K selection constants.
#[derive(Deserialize, Clone, Debug)]
pub struct Ranking {
    pub w_csi: f64,
    pub w_percentile: f64,
    pub heap_floor: usize,
    pub min_spacing_m: f64,
    pub reference_ring_radius_km: f64,
    pub reference_ring_points: usize,
    /// Number of results returned when a request does not specify one
    /// (the wire request shape has no per-call `k`; see SPEC_FULL.md §9).
    pub default_k: usize,
}

/// Month-indexed climatology tables used by the bias corrector's baseline.
#[derive(Deserialize, Clone, Debug)]
pub struct Climatology {
    /// Attenuation factor per month (Jan = index 0), expected in [0.55, 0.72].
    pub attenuation: [f64; 12],
    /// Mean ambient temperature per month, degrees Celsius.
    pub ambient_temp_c: [f64; 12],
}

/// Synthetic land-price surface parameters plus optional external override.
#[derive(Deserialize, Clone, Debug)]
pub struct LandPrice {
    pub base_usd_per_m2: f64,
    pub urban_gradient: f64,
    pub lat_gradient: f64,
    pub lng_gradient: f64,
    pub floor_usd_per_m2: f64,
    pub cache_ttl_secs: u64,
    pub urban_centers: Vec<(f64, f64)>,
}

/// Timeouts and endpoints for external collaborators.
#[derive(Deserialize, Clone, Debug)]
pub struct Providers {
    pub polygon_timeout_secs: u64,
    pub polygon_endpoint: Option<String>,
    pub land_price_timeout_secs: u64,
    pub land_price_endpoint: Option<String>,
    pub land_price_api_key: Option<String>,
}

/// Candidate sampling bounds.
#[derive(Deserialize, Clone, Debug)]
pub struct Sampling {
    pub min_candidates: usize,
    pub max_candidates: usize,
    pub density_per_km2: f64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub general: General,
    pub ranking: Ranking,
    pub climatology: Climatology,
    pub land_price: LandPrice,
    pub providers: Providers,
    pub sampling: Sampling,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: General {
                log_path: "solar_engine.log".to_string(),
                log_level: LevelFilter::Info,
                log_to_stdout: true,
                worker_threads: 4,
                panel_efficiency: 0.20,
            },
            ranking: Ranking {
                w_csi: 0.6,
                w_percentile: 0.4,
                heap_floor: 20,
                min_spacing_m: 500.0,
                reference_ring_radius_km: 2.0,
                reference_ring_points: 12,
                default_k: 20,
            },
            climatology: Climatology {
                attenuation: [0.58, 0.60, 0.63, 0.65, 0.68, 0.72, 0.71, 0.69, 0.66, 0.62, 0.59, 0.57],
                ambient_temp_c: [2.0, 3.0, 7.0, 12.0, 17.0, 21.0, 24.0, 23.0, 19.0, 13.0, 7.0, 3.0],
            },
            land_price: LandPrice {
                base_usd_per_m2: 400.0,
                urban_gradient: 0.00015,
                lat_gradient: 0.01,
                lng_gradient: 0.002,
                floor_usd_per_m2: 50.0,
                cache_ttl_secs: 24 * 3600,
                urban_centers: vec![
                    (40.7128, -74.0060),  // New York
                    (34.0522, -118.2437), // Los Angeles
                    (51.5074, -0.1278),   // London
                    (48.8566, 2.3522),    // Paris
                    (35.6762, 139.6503),  // Tokyo
                    (-33.8688, 151.2093), // Sydney
                    (19.4326, -99.1332),  // Mexico City
                    (30.2672, -97.7431),  // Austin
                ],
            },
            providers: Providers {
                polygon_timeout_secs: 10,
                polygon_endpoint: None,
                land_price_timeout_secs: 5,
                land_price_endpoint: None,
                land_price_api_key: None,
            },
            sampling: Sampling {
                min_candidates: 200,
                max_candidates: 2000,
                density_per_km2: 30.0,
            },
        }
    }
}

/// Loads the configuration file and returns a fully populated `Config`.
///
/// # Arguments
///
/// * 'config_path' - path to the TOML configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}

/// Error depicting errors that occur while loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("error parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("error setting up logging: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_ranking_weights() {
        let cfg = Config::default();
        assert!((cfg.ranking.w_csi + cfg.ranking.w_percentile - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_config_has_twelve_month_tables() {
        let cfg = Config::default();
        assert_eq!(cfg.climatology.attenuation.len(), 12);
        assert_eq!(cfg.climatology.ambient_temp_c.len(), 12);
        for a in cfg.climatology.attenuation {
            assert!(a >= 0.55 && a <= 0.72);
        }
    }
}
