//! Mock secret client for testing
//!
//! Answers from an in-process map without any network, and counts queries so
//! tests can check how often the remote side was consulted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{ClientError, ClientResult};
use super::traits::SecretClient;
use crate::types::SecretValue;

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Answer from the stored values; unknown names are a service error
    Values,
    /// Fail every query with the given service error
    Error { code: i64, message: String },
}

/// In-process secret client
#[derive(Debug)]
pub struct MockSecretClient {
    mode: MockMode,
    values: RwLock<HashMap<String, SecretValue>>,
    queries: AtomicUsize,
}

impl MockSecretClient {
    /// Create a mock with no values
    pub fn new() -> Self {
        Self::with_values(HashMap::new())
    }

    /// Create a mock answering from `values`
    pub fn with_values(values: HashMap<String, SecretValue>) -> Self {
        Self {
            mode: MockMode::Values,
            values: RwLock::new(values),
            queries: AtomicUsize::new(0),
        }
    }

    /// Create a mock whose every query fails
    pub fn failing(code: i64, message: impl Into<String>) -> Self {
        Self {
            mode: MockMode::Error { code, message: message.into() },
            values: RwLock::new(HashMap::new()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Set the value the service holds for `name`
    pub fn set(&self, name: impl Into<String>, value: SecretValue) {
        self.values.write().insert(name.into(), value);
    }

    /// Number of queries received so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn answer(&self, name: &str) -> ClientResult<SecretValue> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            MockMode::Values => self.values.read().get(name).cloned().ok_or_else(|| {
                ClientError::Service {
                    code: 404,
                    message: format!("Secret not found: {}", name),
                }
            }),
            MockMode::Error { code, message } => Err(ClientError::Service {
                code: *code,
                message: message.clone(),
            }),
        }
    }
}

impl Default for MockSecretClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretClient for MockSecretClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn query_secret_value(&self, name: &str) -> ClientResult<SecretValue> {
        self.answer(name)
    }

    async fn query_secret_value_async(&self, name: &str) -> ClientResult<SecretValue> {
        self.answer(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_values() {
        let client = MockSecretClient::new();
        client.set("creds", json!({"user": "u"}));

        assert_eq!(client.query_secret_value("creds").unwrap(), json!({"user": "u"}));
        assert!(matches!(
            client.query_secret_value("other"),
            Err(ClientError::Service { code: 404, .. })
        ));
        assert_eq!(client.query_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let client = MockSecretClient::failing(503, "unavailable");
        let err = client.query_secret_value_async("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Service error 503: unavailable");
        assert_eq!(client.query_count(), 1);
    }
}
