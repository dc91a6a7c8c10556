use policyblob_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors returned to the policy engine.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid account")]
    InvalidAccount,

    #[error("invalid credentials")]
    InvalidCredential,

    #[error("invalid connection string")]
    InvalidConnectionString,

    #[error("invalid key")]
    InvalidKey,

    #[error("invalid container")]
    InvalidContainer,

    #[error("invalid object")]
    InvalidObject,

    #[error("container does not exist: {0}")]
    ContainerNotFound(String),

    #[error("object does not exist: {0}")]
    ObjectNotFound(String),

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed policy line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },

    #[error("failed to read policy document: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification of [`AdapterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any network call.
    InvalidArgument,
    /// The container or the policy object is missing.
    NotFound,
    /// The operation is not supported by this adapter.
    Unimplemented,
    Timeout,
    /// The stored document could not be read or parsed.
    Decode,
    /// Passed through from the object store.
    Store,
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::InvalidAccount
            | AdapterError::InvalidCredential
            | AdapterError::InvalidConnectionString
            | AdapterError::InvalidKey
            | AdapterError::InvalidContainer
            | AdapterError::InvalidObject => ErrorKind::InvalidArgument,
            AdapterError::ContainerNotFound(_) | AdapterError::ObjectNotFound(_) => {
                ErrorKind::NotFound
            }
            AdapterError::Unimplemented(_) => ErrorKind::Unimplemented,
            AdapterError::Timeout(_) => ErrorKind::Timeout,
            AdapterError::MalformedLine { .. } | AdapterError::Read(_) => ErrorKind::Decode,
            AdapterError::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        AdapterError::MalformedLine {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
