//! Secret handle

use serde::{Deserialize, Serialize};

use super::value::SecretValue;
use crate::context::ExecutionContext;
use crate::resolver::{ResolveResult, SecretResolver};

/// A named secret
///
/// Only the name is held. The value is resolved on every call to [`Secret::get`]
/// and never stored on the handle, so a `Secret` can be serialized into a flow
/// definition without leaking anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Secret {
    name: String,
}

impl Secret {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The secret's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the secret's value
    pub fn get(&self, resolver: &SecretResolver, context: &ExecutionContext) -> ResolveResult<SecretValue> {
        resolver.resolve(&self.name, context)
    }

    /// Resolve the secret's value without blocking the calling thread
    pub async fn get_async(
        &self,
        resolver: &SecretResolver,
        context: &ExecutionContext,
    ) -> ResolveResult<SecretValue> {
        resolver.resolve_async(&self.name, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_serializes_name_only() {
        let secret = Secret::new("db_pw");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, r#"{"name":"db_pw"}"#);

        let back: Secret = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "db_pw");
    }
}
