use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error returned by `Engine::analyze`.
///
/// `ProviderUnavailable` and `NumericDegenerate` (spec error kinds) are
/// intentionally absent here: both are recovered locally by the stage that
/// hits them (logged, pipeline continues with a degraded result) and never
/// propagate past the orchestrator. Only the genuinely fatal and the
/// co-operative-cancellation cases surface to the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("analysis cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("cancellation flag poisoned: {0}")]
    Poisoned(String),
}

impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for AnalysisError {
    fn from(e: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        AnalysisError::Poisoned(e.to_string())
    }
}

impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for AnalysisError {
    fn from(e: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        AnalysisError::Poisoned(e.to_string())
    }
}
