pub mod bias_corrector;
pub mod config;
pub mod daily_integrator;
pub mod errors;
pub mod exclusion;
pub mod geo;
pub mod irradiance;
pub mod land_price;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod sampler;
pub mod solar_geometry;
pub mod topk;

pub use errors::AnalysisError;
pub use models::{Coordinate, ExclusionConfig, ProgressEvent, ResultItem, SearchRequest, Stage};
pub use orchestrator::{CancellationToken, Engine};
