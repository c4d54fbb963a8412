//! RPC module for local secret services
//!
//! A flow runner may sit next to a secret service (an agent, a vault proxy) that
//! answers over a local socket. The protocol uses:
//! - Unix sockets (or named pipes on Windows)
//! - JSON-RPC 2.0 with Content-Length headers (LSP-style)
//! - An authentication token sent with every request
//!
//! ```rust,ignore
//! let client = RpcSecretClient::from_parts("agent", "/run/agent.sock", token);
//! let value = client.query_secret_value("db_pw")?;
//! ```

mod client;
mod endpoint;
mod rpc_secret_client;

pub use client::{RpcClient, DEFAULT_TIMEOUT, MAX_MESSAGE_BYTES};
pub use endpoint::RpcEndpoint;
pub use rpc_secret_client::{RpcSecretClient, SECRET_VALUE_METHOD};
