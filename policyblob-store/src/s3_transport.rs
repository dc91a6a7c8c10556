//! S3-backed object store.
//!
//! Containers map to buckets and objects to keys. The client is built once
//! from the configured credentials; session credentials are checked for
//! expiry before every request so an expired token fails without a round trip.

use crate::config::{DEFAULT_REGION, S3Settings};
use crate::error::{StoreError, StoreResult};
use crate::store::{ObjectReader, ObjectStore};
use crate::types::{ConnectionString, ListPage, SessionToken, StoreCredentials};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use std::time::SystemTime;
use tracing::debug;

const PROVIDER_NAME: &str = "policyblob";

/// S3 implementation of [`ObjectStore`].
pub struct S3ObjectStore {
    client: S3Client,
    region: String,
    session: Option<SessionToken>,
}

impl S3ObjectStore {
    /// Builds a store from one of the supported credential forms.
    ///
    /// A connection string's `Endpoint` and `Region` take precedence over
    /// `settings`.
    pub fn new(credentials: &StoreCredentials, settings: &S3Settings) -> StoreResult<Self> {
        let mut region = settings.region.clone();
        let mut endpoint = settings.endpoint_override.clone();
        let mut session = None;

        let credentials = match credentials {
            StoreCredentials::Session { account, token } => {
                let token = token.as_ref().ok_or_else(|| {
                    StoreError::Config("session credentials require a token".to_string())
                })?;
                session = Some(token.clone());
                aws_credential_types::Credentials::new(
                    account,
                    &token.secret_access_key,
                    Some(token.session_token.clone()),
                    Some(SystemTime::from(token.expires_at)),
                    PROVIDER_NAME,
                )
            }
            StoreCredentials::SharedKey { account, key } => {
                aws_credential_types::Credentials::new(account, key, None, None, PROVIDER_NAME)
            }
            StoreCredentials::ConnectionString(raw) => {
                let parsed: ConnectionString = raw.parse()?;
                if let Some(r) = parsed.region {
                    region = r;
                }
                if parsed.endpoint.is_some() {
                    endpoint = parsed.endpoint;
                }
                aws_credential_types::Credentials::new(
                    parsed.access_key_id,
                    parsed.secret_access_key,
                    parsed.session_token,
                    None,
                    PROVIDER_NAME,
                )
            }
        };

        if region.is_empty() {
            region = DEFAULT_REGION.to_string();
        }

        let mut config_builder = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::new(region.clone()))
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(ref endpoint) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: S3Client::from_conf(config_builder.build()),
            region,
            session,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn ensure_fresh(&self) -> StoreResult<()> {
        match self.session {
            Some(ref token) if token.is_expired() => Err(StoreError::CredentialExpired),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn create_container(&self, container: &str) -> StoreResult<()> {
        self.ensure_fresh()?;

        let mut request = self.client.create_bucket().bucket(container);
        // us-east-1 rejects an explicit location constraint.
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                debug!("created bucket s3://{container}");
                Ok(())
            }
            Err(e) => match e.as_service_error() {
                Some(se) if se.is_bucket_already_exists() => {
                    Err(StoreError::ContainerAlreadyExists(container.to_string()))
                }
                Some(se) if se.is_bucket_already_owned_by_you() => {
                    Err(StoreError::ResourceAlreadyExists(container.to_string()))
                }
                _ => Err(StoreError::Transport(format!(
                    "create bucket failed for {container}: {}",
                    DisplayErrorContext(&e)
                ))),
            },
        }
    }

    async fn download(&self, container: &str, object: &str) -> StoreResult<ObjectReader> {
        self.ensure_fresh()?;

        let resp = match self
            .client
            .get_object()
            .bucket(container)
            .key(object)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.as_service_error() {
                    Some(se) if se.is_no_such_key() => {
                        StoreError::ObjectNotFound(container.to_string(), object.to_string())
                    }
                    Some(se) if se.code() == Some("NoSuchBucket") => {
                        StoreError::ContainerNotFound(container.to_string())
                    }
                    _ => StoreError::Transport(format!(
                        "download failed for {container}/{object}: {}",
                        DisplayErrorContext(&e)
                    )),
                });
            }
        };

        debug!(
            "streaming {} bytes from s3://{container}/{object}",
            resp.content_length().unwrap_or_default()
        );
        Ok(Box::pin(resp.body.into_async_read()))
    }

    async fn upload(&self, container: &str, object: &str, data: Vec<u8>) -> StoreResult<()> {
        self.ensure_fresh()?;

        let size = data.len();
        self.client
            .put_object()
            .bucket(container)
            .key(object)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.code() == Some("NoSuchBucket") => {
                    StoreError::ContainerNotFound(container.to_string())
                }
                _ => StoreError::Transport(format!(
                    "upload failed for {container}/{object}: {}",
                    DisplayErrorContext(&e)
                )),
            })?;

        debug!("uploaded {size} bytes to s3://{container}/{object}");
        Ok(())
    }

    async fn list_containers(&self, prefix: &str, marker: Option<String>) -> StoreResult<ListPage> {
        self.ensure_fresh()?;

        let resp = self
            .client
            .list_buckets()
            .prefix(prefix)
            .set_continuation_token(marker)
            .send()
            .await
            .map_err(|e| {
                StoreError::Transport(format!(
                    "list buckets failed for prefix {prefix}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let names = resp
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(|n| n.to_string()))
            .collect();

        Ok(ListPage {
            names,
            next_marker: resp.continuation_token().map(|t| t.to_string()),
        })
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        marker: Option<String>,
    ) -> StoreResult<ListPage> {
        self.ensure_fresh()?;

        let resp = self
            .client
            .list_objects_v2()
            .bucket(container)
            .prefix(prefix)
            .set_continuation_token(marker)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(se) if se.is_no_such_bucket() => {
                    StoreError::ContainerNotFound(container.to_string())
                }
                _ => StoreError::Transport(format!(
                    "list failed for {container} prefix {prefix}: {}",
                    DisplayErrorContext(&e)
                )),
            })?;

        let names = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();

        Ok(ListPage {
            names,
            next_marker: resp.next_continuation_token().map(|t| t.to_string()),
        })
    }
}
