//! Local secret storage
//!
//! The flow runner fills a `LocalSecretStore` and hands it to the run through the
//! execution context. The resolver reads from it when local secrets are enabled.

mod local_store;

pub use local_store::LocalSecretStore;
