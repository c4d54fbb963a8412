//! Core types for secret resolution

mod value;
mod secret;

pub use value::{SecretValue, RawSecretValue};
pub use secret::Secret;
