//! Remote secret client trait

use async_trait::async_trait;

use super::error::ClientResult;
use crate::types::SecretValue;

/// A client for a remote secret service
///
/// Implementations:
/// - `RpcSecretClient`: JSON-RPC over a local socket
/// - `GraphQlSecretClient`: GraphQL over HTTP
/// - `MockSecretClient`: in-process, for testing
///
/// Timeouts and retries, if any, belong to the implementation.
#[async_trait]
pub trait SecretClient: Send + Sync {
    /// Human-readable name of this client
    fn name(&self) -> &str;

    /// Query the stored value of `name`
    fn query_secret_value(&self, name: &str) -> ClientResult<SecretValue>;

    /// Query the stored value of `name` without blocking the calling thread
    async fn query_secret_value_async(&self, name: &str) -> ClientResult<SecretValue>;
}
