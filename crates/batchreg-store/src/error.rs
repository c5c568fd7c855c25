use batchreg_types::{BatchId, RegistryError};

/// Errors from batch store primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists for the id.
    #[error("batch not found: {0}")]
    NotFound(BatchId),

    /// A record already exists for the id.
    #[error("batch already exists: {0}")]
    AlreadyExists(BatchId),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => RegistryError::NotExists,
            // Only reachable when the id counter can no longer produce a
            // fresh id.
            StoreError::AlreadyExists(_) => RegistryError::LimitExceeded,
        }
    }
}
