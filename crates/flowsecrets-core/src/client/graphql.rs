//! GraphQL secret client
//!
//! Queries a hosted secret service over HTTP:
//!
//! ```graphql
//! query($name: String!) {
//!     secretValue(name: $name)
//! }
//! ```
//!
//! The value is read from `data.secretValue`. A non-success HTTP status or a
//! non-empty `errors` array is reported as a `ClientError`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::error::{ClientError, ClientResult};
use super::traits::SecretClient;
use crate::types::SecretValue;

/// GraphQL document used to fetch a secret
pub const SECRET_VALUE_QUERY: &str = "query($name: String!) { secretValue(name: $name) }";

/// Secret client for a GraphQL API
pub struct GraphQlSecretClient {
    api_url: String,
    api_token: Option<String>,
    http: reqwest::Client,
}

impl GraphQlSecretClient {
    /// Create a client for the API at `api_url`
    pub fn new(api_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token,
            http: reqwest::Client::new(),
        }
    }

    /// The API URL queries are sent to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request_body(name: &str) -> Value {
        json!({
            "query": SECRET_VALUE_QUERY,
            "variables": { "name": name },
        })
    }

    fn query_blocking(&self, name: &str) -> ClientResult<SecretValue> {
        tracing::debug!(url = %self.api_url, "querying secret service");

        let mut request = reqwest::blocking::Client::new()
            .post(&self.api_url)
            .json(&Self::request_body(name));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let body: Value = request.send()?.error_for_status()?.json()?;
        Self::parse_response(body)
    }

    fn parse_response(body: Value) -> ClientResult<SecretValue> {
        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("Unknown error")
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ClientError::GraphQl(message));
            }
        }

        body.get("data")
            .and_then(|data| data.get("secretValue"))
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse("Missing data.secretValue".to_string()))
    }
}

#[async_trait]
impl SecretClient for GraphQlSecretClient {
    fn name(&self) -> &str {
        "graphql"
    }

    /// Blocking query
    ///
    /// Safe to call from a thread driving an async runtime: the request then runs
    /// on a short-lived helper thread and the caller waits for it.
    fn query_secret_value(&self, name: &str) -> ClientResult<SecretValue> {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.query_blocking(name);
        }

        // reqwest's blocking client owns a runtime, which can't be built or dropped here
        std::thread::scope(|scope| {
            scope.spawn(|| self.query_blocking(name)).join().unwrap_or_else(|_| {
                Err(ClientError::ConnectionFailed(
                    "GraphQL request thread panicked".to_string(),
                ))
            })
        })
    }

    async fn query_secret_value_async(&self, name: &str) -> ClientResult<SecretValue> {
        tracing::debug!(url = %self.api_url, "querying secret service");

        let mut request = self.http.post(&self.api_url).json(&Self::request_body(name));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        Self::parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::resolver::{ResolutionError, SecretResolver};
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({"variables": {"name": "db_pw"}})))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> GraphQlSecretClient {
        GraphQlSecretClient::new(format!("{}/graphql", server.uri()), token.map(str::to_string))
    }

    #[test]
    fn test_request_body() {
        let body = GraphQlSecretClient::request_body("db_pw");
        assert_eq!(body["query"], SECRET_VALUE_QUERY);
        assert_eq!(body["variables"]["name"], "db_pw");
    }

    #[test]
    fn test_parse_value() {
        let body = json!({"data": {"secretValue": {"user": "admin", "port": 5432}}});
        assert_eq!(
            GraphQlSecretClient::parse_response(body).unwrap(),
            json!({"user": "admin", "port": 5432})
        );

        let null = json!({"data": {"secretValue": null}});
        assert_eq!(GraphQlSecretClient::parse_response(null).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_errors() {
        let body = json!({
            "data": null,
            "errors": [{"message": "Unauthorized"}, {"message": "Secret missing"}]
        });
        let err = GraphQlSecretClient::parse_response(body).unwrap_err();
        assert!(matches!(err, ClientError::GraphQl(ref m) if m == "Unauthorized; Secret missing"));
    }

    #[test]
    fn test_parse_missing_field() {
        let err = GraphQlSecretClient::parse_response(json!({"data": {}})).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_client_name() {
        let client = GraphQlSecretClient::new("https://api.example.com/graphql", None);
        assert_eq!(client.name(), "graphql");
        assert_eq!(client.api_url(), "https://api.example.com/graphql");
    }

    #[tokio::test]
    async fn test_async_query_value() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"secretValue": {"user": "admin", "port": 5432}}})),
        )
        .await;

        let client = client_for(&server, Some("tok"));
        let value = client.query_secret_value_async("db_pw").await.unwrap();
        assert_eq!(value, json!({"user": "admin", "port": 5432}));
    }

    #[tokio::test]
    async fn test_async_query_without_token_is_rejected() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(json!({"data": {"secretValue": "x"}}))).await;

        // No bearer header, so the route does not match and the server answers 404
        let client = client_for(&server, None);
        let err = client.query_secret_value_async("db_pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    async fn test_async_http_status_error() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500)).await;

        let client = client_for(&server, Some("tok"));
        let err = client.query_secret_value_async("db_pw").await.unwrap_err();
        match err {
            ClientError::Http(e) => assert_eq!(e.status().map(|s| s.as_u16()), Some(500)),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_graphql_errors() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": null, "errors": [{"message": "Secret missing"}]})),
        )
        .await;

        let client = client_for(&server, Some("tok"));
        let err = client.query_secret_value_async("db_pw").await.unwrap_err();
        assert!(matches!(err, ClientError::GraphQl(ref m) if m == "Secret missing"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_query_value() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(json!({"data": {"secretValue": "s3cr3t"}}))).await;

        let client = client_for(&server, Some("tok"));
        let value = tokio::task::spawn_blocking(move || client.query_secret_value("db_pw"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, json!("s3cr3t"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_query_on_runtime_thread() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500)).await;

        let client = client_for(&server, Some("tok"));
        let err = client.query_secret_value("db_pw").unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    async fn test_sync_resolve_inside_runtime_returns_error() {
        let client = GraphQlSecretClient::new("http://127.0.0.1:9/graphql", None);
        let resolver = SecretResolver::remote(Arc::new(client));

        let err = resolver.resolve("db_pw", &ExecutionContext::new()).unwrap_err();
        assert!(matches!(err, ResolutionError::Client(ClientError::Http(_))));
    }
}
