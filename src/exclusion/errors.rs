use thiserror::Error;

/// Errors from the external polygon provider. None of these are fatal to an
/// analysis: the exclusion filter fails open on any of them (spec.md §4.4).
#[derive(Error, Debug)]
pub enum ExclusionError {
    #[error("network error: {0}")]
    Network(#[from] ureq::Error),
    #[error("error parsing polygon response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("timed out waiting for polygon provider")]
    Timeout,
}
