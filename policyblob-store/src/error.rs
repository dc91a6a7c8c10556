//! Object store error types.

use thiserror::Error;

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur talking to an object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("object not found: {0}/{1}")]
    ObjectNotFound(String, String),

    #[error("container already exists: {0}")]
    ContainerAlreadyExists(String),

    #[error("resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("session credentials expired")]
    CredentialExpired,

    #[error("object store request failed: {0}")]
    Transport(String),

    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// True for the "already exists" family returned by container creation.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            StoreError::ContainerAlreadyExists(_) | StoreError::ResourceAlreadyExists(_)
        )
    }
}
