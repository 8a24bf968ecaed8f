use std::env;
use std::fs;

use anyhow::{Context, Result};
use log::info;

use solar_potential_engine::config::{load_config, Config};
use solar_potential_engine::logging::setup_logger;
use solar_potential_engine::{Engine, SearchRequest};

/// Bundles the loaded configuration and a built `Engine`.
pub struct Mgr {
    pub engine: Engine,
}

/// Loads configuration from the `--config=` CLI argument (falling back to
/// defaults if absent), sets up logging, and builds the `Engine`.
pub fn init() -> Result<(Config, Mgr)> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.iter().find(|p| p.starts_with("--config="));

    let config = match config_path {
        Some(arg) => {
            let path = arg.split_once('=').context("config argument should be correct")?.1;
            load_config(path)?
        }
        None => Config::default(),
    };

    setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;
    info!("starting solar potential engine version: {}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::new(config.clone())?;
    Ok((config, Mgr { engine }))
}

/// Loads a `SearchRequest` from the `--request=` CLI argument, if present.
pub fn load_request() -> Result<Option<SearchRequest>> {
    let args: Vec<String> = env::args().collect();
    let Some(arg) = args.iter().find(|p| p.starts_with("--request=")) else {
        return Ok(None);
    };
    let path = arg.split_once('=').context("request argument should be correct")?.1;
    let body = fs::read_to_string(path)?;
    let request: SearchRequest = serde_json::from_str(&body)?;
    Ok(Some(request))
}
