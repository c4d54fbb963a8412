//! JSON-RPC client for communicating with a local secret service
//!
//! Uses the LSP-style protocol with Content-Length headers over Unix sockets
//! (named pipes on Windows).
//!
//! Provides both sync and async APIs:
//! - Sync: for flow runners that resolve on a worker thread
//! - Async: for runners driven by an async executor

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[cfg(windows)]
use std::fs::OpenOptions;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::client::{ClientError, ClientResult};

/// Read/write timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Largest response body accepted from the service
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// JSON-RPC client
pub struct RpcClient {
    socket_path: String,
    auth_token: String,
    request_id: AtomicU64,
    timeout: Duration,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(socket_path: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            auth_token: auth_token.into(),
            request_id: AtomicU64::new(0),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the socket or pipe requests go to
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Build a request envelope, adding the auth token to the params
    fn build_request<P: Serialize>(&self, method: &str, params: P) -> ClientResult<Value> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let params_value = serde_json::to_value(params)?;
        let params_with_auth = match params_value {
            Value::Object(mut map) => {
                map.insert("auth".to_string(), json!(self.auth_token));
                Value::Object(map)
            }
            Value::Null => json!({ "auth": self.auth_token }),
            other => json!({ "auth": self.auth_token, "data": other }),
        };

        Ok(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params_with_auth,
        }))
    }

    /// Make a JSON-RPC request
    pub fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> ClientResult<R> {
        let request = self.build_request(method, params)?;
        let response = self.send_request(&request)?;
        parse_response(response)
    }

    /// Make a JSON-RPC request without blocking the calling thread
    pub async fn call_async<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ClientResult<R> {
        let request = self.build_request(method, params)?;
        let response = tokio::time::timeout(self.timeout, self.send_request_async(&request))
            .await
            .map_err(|_| ClientError::Timeout)??;
        parse_response(response)
    }

    #[cfg(unix)]
    fn send_request(&self, request: &Value) -> ClientResult<Value> {
        use std::os::unix::net::UnixStream;

        tracing::debug!(socket = %self.socket_path, "connecting to secret service");

        let stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            tracing::error!(socket = %self.socket_path, error = %e, "connection failed");
            ClientError::ConnectionFailed(e.to_string())
        })?;

        stream.set_read_timeout(Some(self.timeout)).ok();
        stream.set_write_timeout(Some(self.timeout)).ok();

        exchange(stream, request)
    }

    #[cfg(windows)]
    fn send_request(&self, request: &Value) -> ClientResult<Value> {
        // Named pipes can be opened like files
        let pipe = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.socket_path)
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        exchange(pipe, request)
    }

    #[cfg(unix)]
    async fn send_request_async(&self, request: &Value) -> ClientResult<Value> {
        use tokio::io::{AsyncWriteExt, BufReader as TokioBufReader};
        use tokio::net::UnixStream;

        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

        stream.write_all(&encode_message(request)?).await?;
        stream.flush().await?;

        let mut reader = TokioBufReader::new(stream);
        read_message_async(&mut reader).await
    }

    #[cfg(windows)]
    async fn send_request_async(&self, request: &Value) -> ClientResult<Value> {
        // No async named pipe support yet; run the blocking exchange off the executor
        let socket_path = self.socket_path.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || {
            let pipe = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&socket_path)
                .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;
            exchange(pipe, &request)
        })
        .await
        .map_err(|e| ClientError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }

    /// Check if the endpoint is reachable
    pub fn ping(&self) -> ClientResult<bool> {
        // Fast-fail before connecting
        if !Path::new(&self.socket_path).exists() {
            return Err(ClientError::ConnectionFailed("Socket does not exist".to_string()));
        }

        #[derive(serde::Deserialize)]
        struct PingResult {
            ok: bool,
        }

        let result: PingResult = self.call("lifecycle/ping", Value::Null)?;
        Ok(result.ok)
    }
}

/// Frame a message with its Content-Length header
pub(crate) fn encode_message(message: &Value) -> ClientResult<Vec<u8>> {
    let content = serde_json::to_string(message)?;
    Ok(format!("Content-Length: {}\r\n\r\n{}", content.len(), content).into_bytes())
}

/// Write one request and read one response over a blocking stream
fn exchange<S: Read + Write>(mut stream: S, request: &Value) -> ClientResult<Value> {
    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("unknown");
    tracing::debug!(method, "sending request");

    stream.write_all(&encode_message(request)?)?;
    stream.flush()?;

    let mut reader = BufReader::new(stream);
    let result = read_message(&mut reader);
    if let Err(e) = &result {
        tracing::error!(method, error = %e, "response read failed");
    }
    result
}

/// Read one framed message
pub(crate) fn read_message<R: BufRead>(reader: &mut R) -> ClientResult<Value> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(ClientError::InvalidResponse("Connection closed".to_string()));
        }

        let header = line.trim();
        if header.is_empty() {
            break;
        }
        if let Some(len) = header.strip_prefix("Content-Length:") {
            content_length = Some(parse_content_length(len)?);
        }
    }

    let length = content_length
        .ok_or_else(|| ClientError::InvalidResponse("Missing Content-Length header".to_string()))?;

    let mut content = vec![0u8; length];
    reader.read_exact(&mut content)?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(unix)]
async fn read_message_async<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> ClientResult<Value> {
    use tokio::io::{AsyncBufReadExt, AsyncReadExt};

    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Err(ClientError::InvalidResponse("Connection closed".to_string()));
        }

        let header = line.trim();
        if header.is_empty() {
            break;
        }
        if let Some(len) = header.strip_prefix("Content-Length:") {
            content_length = Some(parse_content_length(len)?);
        }
    }

    let length = content_length
        .ok_or_else(|| ClientError::InvalidResponse("Missing Content-Length header".to_string()))?;

    let mut content = vec![0u8; length];
    reader.read_exact(&mut content).await?;
    Ok(serde_json::from_slice(&content)?)
}

fn parse_content_length(value: &str) -> ClientResult<usize> {
    let length: usize = value
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidResponse("Invalid Content-Length".to_string()))?;

    if length > MAX_MESSAGE_BYTES {
        return Err(ClientError::InvalidResponse(format!(
            "Content-Length {length} exceeds limit of {MAX_MESSAGE_BYTES} bytes"
        )));
    }
    Ok(length)
}

/// Extract the result of a response, or its error object
fn parse_response<R: DeserializeOwned>(response: Value) -> ClientResult<R> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(ClientError::Service { code, message });
    }

    let result = response
        .get("result")
        .ok_or_else(|| ClientError::InvalidResponse("Missing result field".to_string()))?;

    Ok(serde_json::from_value(result.clone())?)
}
