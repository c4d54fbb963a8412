//! Secret resolution
//!
//! - `SecretResolver`: guard check, backend dispatch, error translation
//! - `SecretBackend`: the local or remote backend a resolver was built with

mod backend;
mod error;
mod secret_resolver;

pub use backend::{SecretBackend, LocalBackend, RemoteBackend};
pub use error::{BackendError, BackendResult, ResolutionError, ResolveResult};
pub use secret_resolver::SecretResolver;
