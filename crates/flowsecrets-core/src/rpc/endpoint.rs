//! RPC endpoint description

use std::path::PathBuf;

use crate::config::RpcSettings;

/// Information about an RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    /// Human-readable name (e.g., "agent", "vault-proxy")
    pub name: String,
    /// Path to the Unix socket or named pipe
    pub socket_path: PathBuf,
    /// Authentication token required for requests
    pub auth_token: String,
}

impl RpcEndpoint {
    pub fn new(
        name: impl Into<String>,
        socket_path: impl Into<PathBuf>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            socket_path: socket_path.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Endpoint described by configuration
    pub fn from_settings(settings: &RpcSettings) -> Self {
        Self::new(
            settings.name.clone(),
            settings.socket_path.clone(),
            settings.auth_token.clone().unwrap_or_default(),
        )
    }
}
