//! S3 connection settings.

use serde::{Deserialize, Serialize};

/// Region used when neither the settings nor a connection string name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Where the S3-compatible service lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Settings {
    /// AWS region for S3.
    pub region: String,

    /// Optional S3 endpoint override (for MinIO and other S3-compatible hosts).
    /// Setting it switches the client to path-style addressing.
    pub endpoint_override: Option<String>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_override: None,
        }
    }
}

impl S3Settings {
    /// Settings for a local MinIO (see docker-compose.test.yml).
    pub fn minio(endpoint: impl Into<String>) -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_override: Some(endpoint.into()),
        }
    }
}
