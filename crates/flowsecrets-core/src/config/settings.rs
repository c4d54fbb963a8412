//! Secrets configuration (YAML file plus environment overrides)
//!
//! The user-level file lives at `~/.config/flowsecrets/config.yaml`:
//!
//! ```yaml
//! use_local_secrets: false
//! remote:
//!   rpc:
//!     socket_path: /run/agent.sock
//!     auth_token: abc
//!   api:
//!     url: https://api.example.com/graphql
//!     token: xyz
//! context:
//!   secrets:
//!     db_pw: '"s3cr3t"'
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::types::RawSecretValue;

/// Selects local or remote secrets
pub const ENV_USE_LOCAL_SECRETS: &str = "FLOWSECRETS_USE_LOCAL_SECRETS";
/// Socket of the RPC secret service
pub const ENV_RPC_SOCKET: &str = "FLOWSECRETS_RPC_SOCKET";
/// Auth token for the RPC secret service
pub const ENV_RPC_TOKEN: &str = "FLOWSECRETS_RPC_TOKEN";
/// URL of the GraphQL secret service
pub const ENV_API_URL: &str = "FLOWSECRETS_API_URL";
/// Bearer token for the GraphQL secret service
pub const ENV_API_TOKEN: &str = "FLOWSECRETS_API_TOKEN";
/// Prefix of variables that define local secrets, e.g. `FLOWSECRETS__SECRETS__DB_PW`
pub const ENV_SECRET_PREFIX: &str = "FLOWSECRETS__SECRETS__";

fn default_rpc_name() -> String {
    "rpc".to_string()
}

/// Secrets configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Read secrets from the run's local store instead of a secret service
    pub use_local_secrets: bool,
    /// Remote secret service settings
    pub remote: RemoteConfig,
    /// Values used to seed the run context
    pub context: ContextConfig,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            use_local_secrets: true,
            remote: RemoteConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

/// Remote secret service settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// JSON-RPC service on a local socket
    pub rpc: Option<RpcSettings>,
    /// GraphQL service over HTTP
    pub api: Option<ApiSettings>,
}

/// JSON-RPC secret service
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcSettings {
    #[serde(default = "default_rpc_name")]
    pub name: String,
    pub socket_path: PathBuf,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl fmt::Debug for RpcSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcSettings")
            .field("name", &self.name)
            .field("socket_path", &self.socket_path)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// GraphQL secret service
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Run context seed values
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Local secrets, by name
    pub secrets: HashMap<String, RawSecretValue>,
}

impl fmt::Debug for ContextConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.secrets.keys().collect();
        names.sort();
        f.debug_struct("ContextConfig").field("secrets", &names).finish()
    }
}

impl SecretsConfig {
    /// Path of the user-level config file
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("flowsecrets").join("config.yaml")
    }

    /// Load the user-level file, then apply environment overrides
    pub fn load() -> ConfigResult<Self> {
        let mut config = Self::load_from(Self::default_path())?;
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Load a config file; a missing or empty file yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply overrides from environment variables
    ///
    /// Takes the variables as an iterator so callers decide where they come from.
    pub fn apply_env<I>(&mut self, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with("FLOWSECRETS"))
            .collect();

        if let Some(value) = vars.remove(ENV_USE_LOCAL_SECRETS) {
            self.use_local_secrets = parse_bool(ENV_USE_LOCAL_SECRETS, &value)?;
        }

        if let Some(socket) = vars.remove(ENV_RPC_SOCKET) {
            let rpc = self.remote.rpc.get_or_insert_with(|| RpcSettings {
                name: default_rpc_name(),
                socket_path: PathBuf::new(),
                auth_token: None,
            });
            rpc.socket_path = PathBuf::from(socket);
        }
        if let Some(token) = vars.remove(ENV_RPC_TOKEN) {
            match self.remote.rpc.as_mut() {
                Some(rpc) => rpc.auth_token = Some(token),
                None => tracing::debug!("{} set without an RPC socket, ignoring", ENV_RPC_TOKEN),
            }
        }

        if let Some(url) = vars.remove(ENV_API_URL) {
            match self.remote.api.as_mut() {
                Some(api) => api.url = url,
                None => self.remote.api = Some(ApiSettings { url, token: None }),
            }
        }
        if let Some(token) = vars.remove(ENV_API_TOKEN) {
            match self.remote.api.as_mut() {
                Some(api) => api.token = Some(token),
                None => tracing::debug!("{} set without an API URL, ignoring", ENV_API_TOKEN),
            }
        }

        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_SECRET_PREFIX) {
                if !name.is_empty() {
                    self.context.secrets.insert(name.to_string(), RawSecretValue::Text(value));
                }
            }
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
