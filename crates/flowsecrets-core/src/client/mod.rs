//! Remote secret clients
//!
//! A `SecretClient` answers one question: what value does the secret service hold
//! for this name. The JSON-RPC implementation lives in [`crate::rpc`].

mod traits;
mod error;
mod graphql;
mod mock;

pub use traits::SecretClient;
pub use error::{ClientError, ClientResult};
pub use graphql::{GraphQlSecretClient, SECRET_VALUE_QUERY};
pub use mock::{MockSecretClient, MockMode};
