//! Policy persistence adapter backed by an object store.
//!
//! Stores a policy rule table as one text object and plugs into a policy
//! engine's load/save contract.
//!
//! # Architecture
//!
//! - `model` holds rules per section and rule type
//! - `codec` turns the model into `tag, field, ...` lines and back
//! - `init` creates the container and an empty object on first use
//! - `adapter` runs load/save under a per-call timeout and maps store errors
//!
//! Single-rule mutations are not supported; every save overwrites the
//! whole document.

pub mod adapter;
pub mod codec;
pub mod config;
pub mod error;
pub mod init;
pub mod model;

pub use adapter::{BlobAdapter, PolicyAdapter};
pub use codec::{decode, encode, load_policy_line};
pub use config::AdapterConfig;
pub use error::{AdapterError, AdapterResult, ErrorKind};
pub use init::ensure_exists;
pub use model::{PolicyModel, Rule, Section};

pub use policyblob_store::{
    InMemoryObjectStore, ObjectStore, S3Settings, SessionToken, StoreCredentials, StoreError,
};
