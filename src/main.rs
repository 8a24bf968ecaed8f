use anyhow::Result;
use log::{error, info};
use rayon::ThreadPoolBuilder;
use solar_potential_engine::{CancellationToken, Coordinate, SearchRequest};

use crate::initialization::{init, load_request};

mod initialization;

fn demo_request() -> SearchRequest {
    SearchRequest {
        center: Coordinate::new(30.2672, -97.7431),
        radius_km: 5.0,
        urban_penalty: true,
        include_land_prices: true,
        rank_by_cost: true,
        exclusion: None,
        seed_salt: None,
    }
}

fn main() -> Result<()> {
    // Load config and build the engine. If initialization fails, we are
    // pretty much out of luck and can't even log the failure properly.
    let (config, mgr) = init()?;

    ThreadPoolBuilder::new().num_threads(config.general.worker_threads).build_global()?;

    let request = load_request()?.unwrap_or_else(demo_request);
    let token = CancellationToken::new();

    match mgr.engine.analyze(&request, &token, |event| {
        info!("progress: {}% [{:?}] {}", event.percent, event.stage, event.message);
    }) {
        Ok(results) => {
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Err(e) => {
            error!("analysis failed: {}", e);
            Err(e.into())
        }
    }
}
