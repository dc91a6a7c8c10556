//! In-process object store.
//!
//! Keeps containers and objects in sorted maps so listings come back in
//! name order, and pages them the same way a remote service does: a page
//! holds at most `page_size` names and the marker is the last name returned.

use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectReader, ObjectStore};
use crate::types::ListPage;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Default maximum number of names per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

type Containers = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

pub struct InMemoryObjectStore {
    containers: Mutex<Containers>,
    page_size: usize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A store whose listings return at most `page_size` names per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            containers: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Containers>> {
        self.containers
            .lock()
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    pub fn contains_container(&self, container: &str) -> bool {
        self.lock()
            .map(|c| c.contains_key(container))
            .unwrap_or(false)
    }

    pub fn contains_object(&self, container: &str, object: &str) -> bool {
        self.lock()
            .map(|c| c.get(container).is_some_and(|objects| objects.contains_key(object)))
            .unwrap_or(false)
    }

    /// Current content of an object, if present.
    pub fn object(&self, container: &str, object: &str) -> Option<Vec<u8>> {
        self.lock()
            .ok()?
            .get(container)
            .and_then(|objects| objects.get(object).cloned())
    }

    pub fn container_count(&self) -> usize {
        self.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn object_count(&self, container: &str) -> usize {
        self.lock()
            .map(|c| c.get(container).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Writes an object directly, creating its container if needed.
    pub fn insert_object(&self, container: &str, object: &str, data: impl Into<Vec<u8>>) {
        if let Ok(mut c) = self.lock() {
            c.entry(container.to_string())
                .or_default()
                .insert(object.to_string(), data.into());
        }
    }

    pub fn insert_container(&self, container: &str) {
        if let Ok(mut c) = self.lock() {
            c.entry(container.to_string()).or_default();
        }
    }

    /// Removes an object. Returns whether it existed.
    pub fn remove_object(&self, container: &str, object: &str) -> bool {
        self.lock()
            .map(|mut c| {
                c.get_mut(container)
                    .is_some_and(|objects| objects.remove(object).is_some())
            })
            .unwrap_or(false)
    }

    /// Removes a container and everything in it. Returns whether it existed.
    pub fn remove_container(&self, container: &str) -> bool {
        self.lock()
            .map(|mut c| c.remove(container).is_some())
            .unwrap_or(false)
    }

    fn page<'a>(
        &self,
        names: impl Iterator<Item = &'a String>,
        prefix: &str,
        marker: Option<&str>,
    ) -> ListPage {
        let mut matching = names
            .filter(|name| name.starts_with(prefix))
            .filter(|name| marker.is_none_or(|m| name.as_str() > m));

        let names: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_marker = match matching.next() {
            Some(_) => names.last().cloned(),
            None => None,
        };

        ListPage { names, next_marker }
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn create_container(&self, container: &str) -> StoreResult<()> {
        let mut containers = self.lock()?;
        if containers.contains_key(container) {
            return Err(StoreError::ContainerAlreadyExists(container.to_string()));
        }
        containers.insert(container.to_string(), BTreeMap::new());
        debug!("memory store: created container {container}");
        Ok(())
    }

    async fn download(&self, container: &str, object: &str) -> StoreResult<ObjectReader> {
        let containers = self.lock()?;
        let objects = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        let data = objects
            .get(object)
            .ok_or_else(|| StoreError::ObjectNotFound(container.to_string(), object.to_string()))?
            .clone();

        Ok(Box::pin(Cursor::new(data)))
    }

    async fn upload(&self, container: &str, object: &str, data: Vec<u8>) -> StoreResult<()> {
        let mut containers = self.lock()?;
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        let size = data.len();
        objects.insert(object.to_string(), data);
        debug!("memory store: wrote {size} bytes to {container}/{object}");
        Ok(())
    }

    async fn list_containers(&self, prefix: &str, marker: Option<String>) -> StoreResult<ListPage> {
        let containers = self.lock()?;
        Ok(self.page(containers.keys(), prefix, marker.as_deref()))
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> StoreResult<ListPage> {
        let containers = self.lock()?;
        let objects = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        Ok(self.page(objects.keys(), prefix, marker.as_deref()))
    }
}
