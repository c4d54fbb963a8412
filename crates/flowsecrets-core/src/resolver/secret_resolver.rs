//! Secret resolution
//!
//! Every call runs the same path, with nothing cached between calls:
//! 1. Refuse if the context is building a flow definition
//! 2. Ask the backend chosen at construction
//! 3. Hand back the value, or the backend's error as it was raised

use std::sync::Arc;

use super::backend::{LocalBackend, RemoteBackend, SecretBackend};
use super::error::{BackendError, ResolveResult};
use crate::client::{GraphQlSecretClient, SecretClient};
use crate::config::{ConfigError, ConfigResult, SecretsConfig};
use crate::context::{check_access_allowed, ExecutionContext};
use crate::rpc::{RpcEndpoint, RpcSecretClient};
use crate::types::SecretValue;

/// Resolves secret names to values
#[derive(Debug, Clone)]
pub struct SecretResolver {
    backend: SecretBackend,
}

impl SecretResolver {
    /// Create a resolver over a specific backend
    pub fn new(backend: SecretBackend) -> Self {
        Self { backend }
    }

    /// Create a resolver reading the run's local secrets
    pub fn local() -> Self {
        Self::new(SecretBackend::Local(LocalBackend))
    }

    /// Create a resolver querying a remote secret service
    pub fn remote(client: Arc<dyn SecretClient>) -> Self {
        Self::new(SecretBackend::Remote(RemoteBackend::new(client)))
    }

    /// Create a resolver as configured
    ///
    /// With `use_local_secrets` set, the local backend is used. Otherwise the RPC
    /// service is preferred over the GraphQL API when both are configured.
    pub fn from_config(config: &SecretsConfig) -> ConfigResult<Self> {
        if config.use_local_secrets {
            tracing::debug!("using local secrets");
            return Ok(Self::local());
        }

        if let Some(rpc) = &config.remote.rpc {
            tracing::debug!(socket = %rpc.socket_path.display(), "using RPC secret service");
            let client = RpcSecretClient::new(&RpcEndpoint::from_settings(rpc));
            return Ok(Self::remote(Arc::new(client)));
        }

        if let Some(api) = &config.remote.api {
            tracing::debug!(url = %api.url, "using GraphQL secret service");
            let client = GraphQlSecretClient::new(api.url.clone(), api.token.clone());
            return Ok(Self::remote(Arc::new(client)));
        }

        Err(ConfigError::NoRemoteService)
    }

    /// The backend this resolver reads from
    pub fn backend(&self) -> &SecretBackend {
        &self.backend
    }

    /// Whether this resolver reads local secrets
    pub fn is_local(&self) -> bool {
        matches!(self.backend, SecretBackend::Local(_))
    }

    /// Resolve `name` to its value
    pub fn resolve(&self, name: &str, context: &ExecutionContext) -> ResolveResult<SecretValue> {
        check_access_allowed(context)?;

        tracing::debug!(secret = name, backend = self.backend.name(), "resolving secret");
        let result = self.backend.lookup(name, context);
        Self::log_failure(name, &result);
        result.map_err(Into::into)
    }

    /// Resolve `name` to its value without blocking the calling thread
    pub async fn resolve_async(
        &self,
        name: &str,
        context: &ExecutionContext,
    ) -> ResolveResult<SecretValue> {
        check_access_allowed(context)?;

        tracing::debug!(secret = name, backend = self.backend.name(), "resolving secret");
        let result = self.backend.lookup_async(name, context).await;
        Self::log_failure(name, &result);
        result.map_err(Into::into)
    }

    fn log_failure(name: &str, result: &Result<SecretValue, BackendError>) {
        match result {
            Ok(_) => {}
            Err(BackendError::NotFound(_)) => {
                tracing::warn!(secret = name, "local secret not found");
            }
            Err(BackendError::Client(e)) => {
                tracing::warn!(secret = name, error = %e, "secret service query failed");
            }
        }
    }
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self::local()
    }
}
