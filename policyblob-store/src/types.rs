use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One page of a prefix listing.
///
/// `next_marker` is `Some` while more pages remain; the caller passes it back
/// to fetch the next page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    pub names: Vec<String>,
    pub next_marker: Option<String>,
}

impl ListPage {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn has_more(&self) -> bool {
        self.next_marker.is_some()
    }
}

/// Temporary credential issued for an access key (STS style).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionToken {
    pub secret_access_key: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// The credential forms a store can be opened with.
#[derive(Clone, Debug)]
pub enum StoreCredentials {
    /// Access key id plus a session credential. `None` is an absent credential.
    Session {
        account: String,
        token: Option<SessionToken>,
    },
    /// Static access key id (`account`) and secret (`key`).
    SharedKey { account: String, key: String },
    /// `Endpoint=...;Region=...;AccessKeyId=...;SecretAccessKey=...`
    ConnectionString(String),
}

/// Parsed form of [`StoreCredentials::ConnectionString`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl FromStr for ConnectionString {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parsed = ConnectionString::default();

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Secrets are often base64, so only the first '=' separates key and value.
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                StoreError::Config(format!("connection string segment without '=': {segment}"))
            })?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => parsed.endpoint = Some(value),
                "region" => parsed.region = Some(value),
                "accesskeyid" => parsed.access_key_id = value,
                "secretaccesskey" => parsed.secret_access_key = value,
                "sessiontoken" => parsed.session_token = Some(value),
                other => {
                    return Err(StoreError::Config(format!(
                        "unknown connection string key: {other}"
                    )));
                }
            }
        }

        if parsed.access_key_id.is_empty() {
            return Err(StoreError::Config(
                "connection string is missing AccessKeyId".to_string(),
            ));
        }
        if parsed.secret_access_key.is_empty() {
            return Err(StoreError::Config(
                "connection string is missing SecretAccessKey".to_string(),
            ));
        }

        Ok(parsed)
    }
}
