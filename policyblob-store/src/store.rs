//! The object store capability consumed by the policy adapter.

use crate::error::StoreResult;
use crate::types::ListPage;
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncBufRead;

/// Streamed object body.
pub type ObjectReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// Container/object storage.
///
/// Implementations report missing containers and objects as
/// [`StoreError::ContainerNotFound`](crate::StoreError::ContainerNotFound) and
/// [`StoreError::ObjectNotFound`](crate::StoreError::ObjectNotFound), and a
/// container that already exists as one of the "already exists" variants.
/// Retries and authentication belong to the implementation, not its callers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates a container.
    async fn create_container(&self, container: &str) -> StoreResult<()>;

    /// Opens an object for reading.
    async fn download(&self, container: &str, object: &str) -> StoreResult<ObjectReader>;

    /// Writes an object, replacing any previous content.
    async fn upload(&self, container: &str, object: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Lists container names starting with `prefix`, one page per call.
    async fn list_containers(&self, prefix: &str, marker: Option<String>) -> StoreResult<ListPage>;

    /// Lists object names in `container` starting with `prefix`, one page per call.
    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> StoreResult<ListPage>;
}
