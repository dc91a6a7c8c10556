//! Shared test helpers for integration tests against real MinIO.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use policyblob_store::{S3ObjectStore, S3Settings, SessionToken, StoreCredentials};
use uuid::Uuid;

pub const MINIO_ENDPOINT: &str = "http://localhost:9000";
pub const MINIO_ACCESS_KEY: &str = "policyblob-test";
pub const MINIO_SECRET_KEY: &str = "policyblob-test-secret";

/// MinIO root credentials as a static key pair.
pub fn minio_shared_key() -> StoreCredentials {
    StoreCredentials::SharedKey {
        account: MINIO_ACCESS_KEY.into(),
        key: MINIO_SECRET_KEY.into(),
    }
}

/// MinIO root credentials masquerading as a session token.
/// MinIO accepts any session_token value with the root access/secret pair.
pub fn minio_session(expires_in: Duration) -> StoreCredentials {
    StoreCredentials::Session {
        account: MINIO_ACCESS_KEY.into(),
        token: Some(SessionToken {
            secret_access_key: MINIO_SECRET_KEY.into(),
            session_token: "integration-test-token".into(),
            expires_at: Utc::now() + expires_in,
        }),
    }
}

/// S3ObjectStore pointing at local MinIO (docker-compose.test.yml).
pub fn test_store() -> S3ObjectStore {
    S3ObjectStore::new(&minio_shared_key(), &S3Settings::minio(MINIO_ENDPOINT))
        .expect("static credentials must build a client")
}

/// Per-test unique bucket name to prevent collisions.
pub fn unique_bucket() -> String {
    format!("policyblob-{}", Uuid::new_v4().simple())
}
