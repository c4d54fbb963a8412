//! Configuration
//!
//! `SecretsConfig` decides which backend a resolver uses and which local secrets
//! a run starts with. Sources, later overriding earlier:
//! 1. Built-in defaults (local secrets enabled)
//! 2. User config file (~/.config/flowsecrets/config.yaml)
//! 3. `FLOWSECRETS_*` environment variables

mod error;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{
    SecretsConfig, RemoteConfig, RpcSettings, ApiSettings, ContextConfig,
    ENV_USE_LOCAL_SECRETS, ENV_RPC_SOCKET, ENV_RPC_TOKEN, ENV_API_URL, ENV_API_TOKEN,
    ENV_SECRET_PREFIX,
};
