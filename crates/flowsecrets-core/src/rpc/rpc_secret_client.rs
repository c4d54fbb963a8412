//! RPC-backed secret client
//!
//! Implements the SecretClient trait by calling `secrets/value` on a local
//! secret service over JSON-RPC.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::RpcClient;
use super::endpoint::RpcEndpoint;
use crate::client::{ClientResult, SecretClient};
use crate::types::SecretValue;

/// Method queried for a secret's value
pub const SECRET_VALUE_METHOD: &str = "secrets/value";

/// A secret client that uses JSON-RPC to reach the secret service
pub struct RpcSecretClient {
    name: String,
    client: RpcClient,
}

#[derive(Serialize)]
struct ValueParams<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ValueResult {
    value: SecretValue,
}

impl RpcSecretClient {
    /// Create a new RPC secret client from an endpoint
    pub fn new(endpoint: &RpcEndpoint) -> Self {
        Self {
            name: format!("rpc:{}", endpoint.name),
            client: RpcClient::new(
                endpoint.socket_path.to_string_lossy().to_string(),
                endpoint.auth_token.clone(),
            ),
        }
    }

    /// Create from socket path and auth token directly
    pub fn from_parts(
        name: impl Into<String>,
        socket_path: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            name: format!("rpc:{}", name.into()),
            client: RpcClient::new(socket_path, auth_token),
        }
    }

    /// Check if the RPC endpoint is reachable
    pub fn is_reachable(&self) -> bool {
        self.client.ping().unwrap_or(false)
    }
}

#[async_trait]
impl SecretClient for RpcSecretClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_secret_value(&self, name: &str) -> ClientResult<SecretValue> {
        let result: ValueResult = self.client.call(SECRET_VALUE_METHOD, ValueParams { name })?;
        Ok(result.value)
    }

    async fn query_secret_value_async(&self, name: &str) -> ClientResult<SecretValue> {
        let result: ValueResult = self
            .client
            .call_async(SECRET_VALUE_METHOD, ValueParams { name })
            .await?;
        Ok(result.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_secret_client_name() {
        let endpoint = RpcEndpoint::new("agent", "/tmp/test.sock", "token");
        let client = RpcSecretClient::new(&endpoint);
        assert_eq!(client.name(), "rpc:agent");
        assert!(!client.is_reachable());
    }

    #[cfg(unix)]
    mod socket {
        use super::*;
        use crate::client::ClientError;
        use crate::rpc::client::{encode_message, read_message};
        use serde_json::{json, Value};
        use std::io::{BufReader, Write};
        use std::os::unix::net::UnixListener;
        use std::path::PathBuf;
        use std::thread::{self, JoinHandle};

        /// Serve one request with `respond`, returning the request seen
        fn serve_once<F>(respond: F) -> (tempfile::TempDir, PathBuf, JoinHandle<Value>)
        where
            F: FnOnce(&Value) -> Value + Send + 'static,
        {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("secrets.sock");
            let listener = UnixListener::bind(&path).unwrap();

            let handle = thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let request = read_message(&mut reader).unwrap();
                let response = respond(&request);
                stream.write_all(&encode_message(&response).unwrap()).unwrap();
                request
            });

            (dir, path, handle)
        }

        #[test]
        fn test_query_over_socket() {
            let (_dir, path, handle) = serve_once(|request| {
                json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "result": {"value": {"user": "admin", "ports": [1, 2]}}
                })
            });

            let client = RpcSecretClient::from_parts("test", path.to_string_lossy(), "tok");
            let value = client.query_secret_value("db").unwrap();
            assert_eq!(value, json!({"user": "admin", "ports": [1, 2]}));

            let request = handle.join().unwrap();
            assert_eq!(request["method"], SECRET_VALUE_METHOD);
            assert_eq!(request["params"], json!({"name": "db", "auth": "tok"}));
        }

        #[test]
        fn test_service_error_over_socket() {
            let (_dir, path, handle) = serve_once(|request| {
                json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": {"code": 404, "message": "Secret not found: db"}
                })
            });

            let client = RpcSecretClient::from_parts("test", path.to_string_lossy(), "tok");
            let err = client.query_secret_value("db").unwrap_err();
            assert!(matches!(err, ClientError::Service { code: 404, .. }));
            handle.join().unwrap();
        }

        #[tokio::test]
        async fn test_async_query_over_socket() {
            let (_dir, path, handle) = serve_once(|request| {
                json!({"jsonrpc": "2.0", "id": request["id"], "result": {"value": "plain"}})
            });

            let client = RpcSecretClient::from_parts("test", path.to_string_lossy(), "tok");
            let value = client.query_secret_value_async("token").await.unwrap();
            assert_eq!(value, json!("plain"));

            let request = handle.join().unwrap();
            assert_eq!(request["params"]["name"], "token");
        }

        #[test]
        fn test_connection_refused() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("absent.sock");

            let client = RpcSecretClient::from_parts("test", path.to_string_lossy(), "tok");
            assert!(matches!(
                client.query_secret_value("db"),
                Err(ClientError::ConnectionFailed(_))
            ));
        }
    }
}
