//! Policy persistence on top of an object store.
//!
//! The whole policy document is one object. Load downloads and decodes it,
//! Save encodes the full model and overwrites the object. The container and
//! an empty object are created eagerly at construction, so after that any
//! not-found on load means the document was removed and is reported.
//!
//! Saves are unconditional overwrites: two adapters saving concurrently race
//! and the later upload wins.

use crate::codec::{self, load_policy_line};
use crate::config::{AdapterConfig, check_container_object};
use crate::error::{AdapterError, AdapterResult};
use crate::init;
use crate::model::PolicyModel;
use async_trait::async_trait;
use policyblob_store::{
    ConnectionString, ObjectStore, S3ObjectStore, S3Settings, SessionToken, StoreCredentials,
    StoreError,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Storage contract the policy engine drives.
#[async_trait]
pub trait PolicyAdapter: Send + Sync {
    /// Loads every stored rule into `model`.
    async fn load_policy(&self, model: &mut PolicyModel) -> AdapterResult<()>;

    /// Replaces the stored document with the full content of `model`.
    async fn save_policy(&self, model: &PolicyModel) -> AdapterResult<()>;

    async fn add_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> AdapterResult<()>;

    async fn remove_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> AdapterResult<()>;

    async fn remove_filtered_policy(
        &self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> AdapterResult<()>;
}

/// Keeps the policy document in a single object of an [`ObjectStore`].
pub struct BlobAdapter {
    store: Arc<dyn ObjectStore>,
    container: String,
    object: String,
    timeout: Duration,
}

impl fmt::Debug for BlobAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobAdapter")
            .field("container", &self.container)
            .field("object", &self.object)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl BlobAdapter {
    /// Creates an adapter over `store`, creating the container and an empty
    /// policy object if they do not exist yet.
    pub async fn new(store: Arc<dyn ObjectStore>, config: AdapterConfig) -> AdapterResult<Self> {
        config.validate()?;

        let adapter = Self {
            store,
            timeout: config.timeout(),
            container: config.container,
            object: config.object,
        };

        adapter
            .bounded(init::ensure_exists(
                adapter.store.as_ref(),
                &adapter.container,
                &adapter.object,
            ))
            .await?;

        Ok(adapter)
    }

    /// Opens an S3 store with `credentials` and creates an adapter over it.
    ///
    /// Credentials and config are validated before any network call.
    pub async fn connect(
        credentials: StoreCredentials,
        settings: &S3Settings,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        check_credentials(&credentials)?;
        config.validate()?;

        let store = S3ObjectStore::new(&credentials, settings)?;
        debug!(
            "opening {}/{} in region {}",
            config.container,
            config.object,
            store.region()
        );
        Self::new(Arc::new(store), config).await
    }

    /// Access key id plus session credential.
    pub async fn from_session(
        account: &str,
        token: Option<SessionToken>,
        settings: &S3Settings,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        let credentials = StoreCredentials::Session {
            account: account.to_string(),
            token,
        };
        Self::connect(credentials, settings, config).await
    }

    /// Static access key id and secret.
    pub async fn from_shared_key(
        account: &str,
        key: &str,
        settings: &S3Settings,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        let credentials = StoreCredentials::SharedKey {
            account: account.to_string(),
            key: key.to_string(),
        };
        Self::connect(credentials, settings, config).await
    }

    /// Endpoint, region and keys from a connection string.
    pub async fn from_connection_string(
        connection_string: &str,
        config: AdapterConfig,
    ) -> AdapterResult<Self> {
        let credentials = StoreCredentials::ConnectionString(connection_string.to_string());
        Self::connect(credentials, &S3Settings::default(), config).await
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Loads the policy document using a caller-supplied line parser.
    pub async fn load_policy_with<F>(&self, model: &mut PolicyModel, handler: F) -> AdapterResult<()>
    where
        F: Fn(&str, &mut PolicyModel) -> AdapterResult<()> + Send + Sync,
    {
        check_container_object(&self.container, &self.object)?;

        self.bounded(async {
            let reader = self
                .store
                .download(&self.container, &self.object)
                .await
                .map_err(|e| self.absent_or(e))?;
            codec::decode(reader, &mut *model, handler).await
        })
        .await?;

        debug!(
            "loaded {} rules from {}/{}",
            model.rule_count(),
            self.container,
            self.object
        );
        Ok(())
    }

    /// Runs `fut` under this adapter's timeout.
    async fn bounded<T, Fut>(&self, fut: Fut) -> AdapterResult<T>
    where
        Fut: Future<Output = AdapterResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout))?
    }

    fn absent_or(&self, err: StoreError) -> AdapterError {
        match err {
            StoreError::ContainerNotFound(_) => {
                AdapterError::ContainerNotFound(self.container.clone())
            }
            StoreError::ObjectNotFound(_, _) => AdapterError::ObjectNotFound(self.object.clone()),
            other => AdapterError::Store(other),
        }
    }
}

#[async_trait]
impl PolicyAdapter for BlobAdapter {
    async fn load_policy(&self, model: &mut PolicyModel) -> AdapterResult<()> {
        self.load_policy_with(model, load_policy_line).await
    }

    async fn save_policy(&self, model: &PolicyModel) -> AdapterResult<()> {
        check_container_object(&self.container, &self.object)?;

        let text = codec::encode(model);
        let size = text.len();

        self.bounded(async {
            match self.store.create_container(&self.container).await {
                Ok(()) => {}
                Err(e) if e.is_already_exists() => {}
                Err(e) => return Err(AdapterError::Store(e)),
            }
            self.store
                .upload(&self.container, &self.object, text.into_bytes())
                .await?;
            Ok::<(), AdapterError>(())
        })
        .await?;

        debug!(
            "saved {} rules ({size} bytes) to {}/{}",
            model.rule_count(),
            self.container,
            self.object
        );
        Ok(())
    }

    async fn add_policy(&self, _sec: &str, _ptype: &str, _rule: &[String]) -> AdapterResult<()> {
        Err(AdapterError::Unimplemented("add_policy"))
    }

    async fn remove_policy(&self, _sec: &str, _ptype: &str, _rule: &[String]) -> AdapterResult<()> {
        Err(AdapterError::Unimplemented("remove_policy"))
    }

    async fn remove_filtered_policy(
        &self,
        _sec: &str,
        _ptype: &str,
        _field_index: usize,
        _field_values: &[String],
    ) -> AdapterResult<()> {
        Err(AdapterError::Unimplemented("remove_filtered_policy"))
    }
}

fn check_credentials(credentials: &StoreCredentials) -> AdapterResult<()> {
    match credentials {
        StoreCredentials::Session { account, token } => {
            if account.is_empty() {
                return Err(AdapterError::InvalidAccount);
            }
            match token {
                Some(t) if !t.secret_access_key.is_empty() && !t.session_token.is_empty() => Ok(()),
                _ => Err(AdapterError::InvalidCredential),
            }
        }
        StoreCredentials::SharedKey { account, key } => {
            if account.is_empty() {
                return Err(AdapterError::InvalidAccount);
            }
            if key.is_empty() {
                return Err(AdapterError::InvalidKey);
            }
            Ok(())
        }
        StoreCredentials::ConnectionString(raw) => {
            if raw.is_empty() {
                return Err(AdapterError::InvalidConnectionString);
            }
            raw.parse::<ConnectionString>()
                .map(|_| ())
                .map_err(|_| AdapterError::InvalidConnectionString)
        }
    }
}
