//! Flowsecrets Core
//!
//! Resolves named secrets while a flow is running.
//! A value comes from one of two backends, chosen once when the resolver is built:
//! - **Local**: an in-process store handed to the run through its [`ExecutionContext`]
//! - **Remote**: a secret service reached through a [`SecretClient`]
//!
//! Secrets may only be read during a run. Resolving while a flow definition is being
//! built fails with a context violation so values never end up captured in a definition.
//!
//! ```rust
//! use flowsecrets_core::{ExecutionContext, LocalSecretStore, Secret, SecretResolver};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(LocalSecretStore::new());
//! store.insert("db_pw", "\"s3cr3t\"");
//!
//! let context = ExecutionContext::new().with_secrets(store);
//! let resolver = SecretResolver::local();
//!
//! let value = Secret::new("db_pw").get(&resolver, &context).unwrap();
//! assert_eq!(value, json!("s3cr3t"));
//! ```

pub mod types;
pub mod context;
pub mod secrets;
pub mod client;
pub mod rpc;
pub mod resolver;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use types::{Secret, SecretValue, RawSecretValue};

pub use context::{ExecutionContext, ContextViolation, check_access_allowed};

pub use secrets::LocalSecretStore;

pub use client::{
    SecretClient, ClientError, ClientResult,
    GraphQlSecretClient, MockSecretClient,
};

pub use rpc::{RpcClient, RpcEndpoint, RpcSecretClient};

pub use resolver::{
    SecretResolver, SecretBackend, LocalBackend, RemoteBackend,
    BackendError, BackendResult, ResolutionError, ResolveResult,
};

pub use config::{SecretsConfig, RemoteConfig, RpcSettings, ApiSettings, ConfigError, ConfigResult};
