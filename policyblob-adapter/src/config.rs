//! Adapter configuration.

use crate::error::{AdapterError, AdapterResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout applied to every remote call unless overridden.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Where the policy document lives and how long each remote call may take.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Container (bucket) holding the policy document.
    pub container: String,

    /// Object (key) name of the policy document.
    pub object: String,

    /// Timeout for each load, save and the construction-time checks.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            container: String::new(),
            object: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AdapterConfig {
    pub fn new(container: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            object: object.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Rejects an empty container or object name.
    pub fn validate(&self) -> AdapterResult<()> {
        check_container_object(&self.container, &self.object)
    }
}

pub(crate) fn check_container_object(container: &str, object: &str) -> AdapterResult<()> {
    if container.is_empty() {
        return Err(AdapterError::InvalidContainer);
    }
    if object.is_empty() {
        return Err(AdapterError::InvalidObject);
    }
    Ok(())
}
