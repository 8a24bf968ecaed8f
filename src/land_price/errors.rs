use thiserror::Error;

/// Errors from the optional external land-price API. None of these are
/// fatal: callers fall back to the synthetic surface with reduced
/// confidence (spec.md §4.9).
#[derive(Error, Debug)]
pub enum LandPriceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("error parsing land price response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no price returned for coordinate")]
    Empty,
}
