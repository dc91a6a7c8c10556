//! Object store capability for policyblob.
//!
//! Provides the container/object operations the policy adapter consumes:
//! - `ObjectStore` trait (create container, download, upload, paged listings)
//! - S3 transport for AWS and S3-compatible services (MinIO)
//! - In-memory store for tests and local development
//! - Credential forms and connection-string parsing

pub mod config;
pub mod error;
pub mod memory;
pub mod s3_transport;
pub mod store;
pub mod types;

pub use config::S3Settings;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use s3_transport::S3ObjectStore;
pub use store::{ObjectReader, ObjectStore};
pub use types::*;
