//! Secret backends
//!
//! A resolver holds exactly one backend, picked when it is built.

use std::fmt;
use std::sync::Arc;

use super::error::{BackendError, BackendResult};
use crate::client::SecretClient;
use crate::context::ExecutionContext;
use crate::types::SecretValue;

/// Reads secrets from the run's local store
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    /// Look `name` up in the context's local store and decode it
    ///
    /// A context without a store behaves like an empty store.
    pub fn lookup(&self, name: &str, context: &ExecutionContext) -> BackendResult<SecretValue> {
        let raw = context
            .secrets()
            .and_then(|store| store.get(name))
            .ok_or_else(|| BackendError::NotFound(name.to_string()))?;

        Ok(raw.decode())
    }
}

/// Reads secrets from a remote secret service
#[derive(Clone)]
pub struct RemoteBackend {
    client: Arc<dyn SecretClient>,
}

impl RemoteBackend {
    pub fn new(client: Arc<dyn SecretClient>) -> Self {
        Self { client }
    }

    /// Name of the underlying client
    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Query the service once for `name`
    pub fn lookup(&self, name: &str) -> BackendResult<SecretValue> {
        Ok(self.client.query_secret_value(name)?)
    }

    /// Query the service once for `name` without blocking
    pub async fn lookup_async(&self, name: &str) -> BackendResult<SecretValue> {
        Ok(self.client.query_secret_value_async(name).await?)
    }
}

impl fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("client", &self.client.name())
            .finish()
    }
}

/// Where a resolver reads secrets from
#[derive(Debug, Clone)]
pub enum SecretBackend {
    /// The run's local store
    Local(LocalBackend),
    /// A remote secret service
    Remote(RemoteBackend),
}

impl SecretBackend {
    /// Short name for logs
    pub fn name(&self) -> &str {
        match self {
            SecretBackend::Local(_) => "local",
            SecretBackend::Remote(remote) => remote.client_name(),
        }
    }

    pub fn lookup(&self, name: &str, context: &ExecutionContext) -> BackendResult<SecretValue> {
        match self {
            SecretBackend::Local(local) => local.lookup(name, context),
            SecretBackend::Remote(remote) => remote.lookup(name),
        }
    }

    pub async fn lookup_async(
        &self,
        name: &str,
        context: &ExecutionContext,
    ) -> BackendResult<SecretValue> {
        match self {
            SecretBackend::Local(local) => local.lookup(name, context),
            SecretBackend::Remote(remote) => remote.lookup_async(name).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockSecretClient;
    use crate::secrets::LocalSecretStore;
    use serde_json::json;

    #[test]
    fn test_local_lookup_without_store() {
        let err = LocalBackend.lookup("db", &ExecutionContext::new()).unwrap_err();
        assert!(matches!(err, BackendError::NotFound(ref n) if n == "db"));
    }

    #[test]
    fn test_local_lookup_decodes() {
        let store = Arc::new(LocalSecretStore::new());
        store.insert("port", "5432");
        let context = ExecutionContext::new().with_secrets(store);

        assert_eq!(LocalBackend.lookup("port", &context).unwrap(), json!(5432));
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(SecretBackend::Local(LocalBackend).name(), "local");

        let remote = RemoteBackend::new(Arc::new(MockSecretClient::new()));
        assert_eq!(SecretBackend::Remote(remote.clone()).name(), "mock");
        assert_eq!(format!("{:?}", remote), "RemoteBackend { client: \"mock\" }");
    }
}
