//! Shared helpers: a recording object store with fault injection.

#![allow(dead_code)]

use async_trait::async_trait;
use policyblob_adapter::{InMemoryObjectStore, PolicyModel, Rule, Section};
use policyblob_store::{ListPage, ObjectReader, ObjectStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const CONTAINER: &str = "policies";
pub const OBJECT: &str = "policy.csv";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn rule(fields: &[&str]) -> Rule {
    fields.iter().map(|f| f.to_string()).collect()
}

/// `p, alice, domain1, data1, read` and `g, alice, admin, domain1`.
pub fn alice_model() -> PolicyModel {
    let mut model = PolicyModel::new();
    model.add_policy(Section::Policy, "p", rule(&["alice", "domain1", "data1", "read"]));
    model.add_policy(Section::Grouping, "g", rule(&["alice", "admin", "domain1"]));
    model
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CreateContainer,
    Download,
    Upload,
    ListContainers,
    ListObjects,
}

/// Wraps an [`InMemoryObjectStore`], recording every call.
///
/// Failures registered with [`RecordingStore::fail`] replace the inner
/// result for that operation; delays run before the inner call.
pub struct RecordingStore {
    pub inner: Arc<InMemoryObjectStore>,
    calls: Mutex<Vec<Op>>,
    failures: Mutex<HashMap<Op, fn() -> StoreError>>,
    delays: Mutex<HashMap<Op, Duration>>,
    hide_containers: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::over(InMemoryObjectStore::new())
    }

    pub fn over(inner: InMemoryObjectStore) -> Self {
        Self::sharing(Arc::new(inner))
    }

    /// A second wrapper over the same backing store, with its own call log,
    /// failures and delays.
    pub fn sharing(inner: Arc<InMemoryObjectStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            hide_containers: false,
        }
    }

    /// Container listings come back empty, as if a concurrent creator had
    /// not become visible yet.
    pub fn hiding_containers(mut self) -> Self {
        self.hide_containers = true;
        self
    }

    pub fn fail(&self, op: Op, err: fn() -> StoreError) {
        self.failures.lock().unwrap().insert(op, err);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    pub fn delay(&self, op: Op, by: Duration) {
        self.delays.lock().unwrap().insert(op, by);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, op: Op) -> StoreResult<()> {
        self.calls.lock().unwrap().push(op);
        let delay = self.delays.lock().unwrap().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().unwrap().get(&op).copied();
        match failure {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn create_container(&self, container: &str) -> StoreResult<()> {
        self.enter(Op::CreateContainer).await?;
        self.inner.create_container(container).await
    }

    async fn download(&self, container: &str, object: &str) -> StoreResult<ObjectReader> {
        self.enter(Op::Download).await?;
        self.inner.download(container, object).await
    }

    async fn upload(&self, container: &str, object: &str, data: Vec<u8>) -> StoreResult<()> {
        self.enter(Op::Upload).await?;
        self.inner.upload(container, object, data).await
    }

    async fn list_containers(&self, prefix: &str, marker: Option<String>) -> StoreResult<ListPage> {
        self.enter(Op::ListContainers).await?;
        if self.hide_containers {
            return Ok(ListPage::default());
        }
        self.inner.list_containers(prefix, marker).await
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> StoreResult<ListPage> {
        self.enter(Op::ListObjects).await?;
        self.inner.list_objects(container, prefix, marker).await
    }
}
