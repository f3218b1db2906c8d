use thiserror::Error;

use orbis_zspace::SliceViolation;

/// Failure taxonomy of the four core operations.
///
/// Validation failures leave the core untouched; an
/// `InternalInvariantViolated` indicates a bug and should be treated as
/// fatal by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FabError {
    #[error("invalid budget: nodes cap must be positive")]
    InvalidBudget,

    #[error("invalid slice: {0}")]
    InvalidSlice(#[from] SliceViolation),

    #[error("core not initialized: init_tick must run before {0}")]
    NotInitialized(&'static str),

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(&'static str),
}
