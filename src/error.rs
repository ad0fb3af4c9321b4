//! Crate-level error type

use crate::graph::ValidationError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors returned by the API layer and the tag index
#[derive(Debug, Error)]
pub enum QuantlinkError {
    /// Caller input was rejected before any storage access
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store failed; propagated unmodified, never retried
    #[error("storage error: {0}")]
    ExternalService(#[from] StorageError),
}

impl QuantlinkError {
    pub fn is_validation(&self) -> bool {
        matches!(self, QuantlinkError::Validation(_))
    }
}

/// Result type for API operations
pub type QuantlinkResult<T> = Result<T, QuantlinkError>;
