//! Repository errors and the persisted-record trait

use bd_core::error::BdError;
use bd_core::traits::Id;
use chrono::{DateTime, Utc};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for BdError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => BdError::NotFound {
                entity: "Record",
                field: "id",
                value: what,
            },
            RepositoryError::Conflict(message) => BdError::Conflict { message },
            RepositoryError::Storage(message) => BdError::Storage(message),
        }
    }
}

/// A value stored under a generated primary key
pub trait Record: Clone + Send + Sync + 'static {
    fn record_id(&self) -> Option<Id>;
    fn assign_id(&mut self, id: Id);

    /// Stamp timestamps on save
    fn touch(&mut self, _now: DateTime<Utc>) {}
}
