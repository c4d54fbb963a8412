//! Remote client error types

use thiserror::Error;

/// Errors raised by a remote secret client
///
/// The resolver forwards these to the caller as they are.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error object returned by the secret service
    #[error("Service error {code}: {message}")]
    Service { code: i64, message: String },

    /// GraphQL `errors` returned by the secret service
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

pub type ClientResult<T> = Result<T, ClientError>;
