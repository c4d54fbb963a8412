//! Resolution error types

use thiserror::Error;

use crate::client::ClientError;
use crate::context::ContextViolation;

/// Errors a backend can return from a lookup
#[derive(Error, Debug)]
pub enum BackendError {
    /// The local store has no entry for the name
    #[error("Local secret \"{0}\" was not found")]
    NotFound(String),

    /// The remote client failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Errors returned by secret resolution
///
/// Each variant points at a different fix:
/// - `ContextViolation`: move the call into the flow run
/// - `NotFound`: provide the secret locally
/// - `Client`: check the secret service
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    ContextViolation(#[from] ContextViolation),

    #[error("Local secret \"{0}\" was not found")]
    NotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<BackendError> for ResolutionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(name) => ResolutionError::NotFound(name),
            BackendError::Client(e) => ResolutionError::Client(e),
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolutionError>;
