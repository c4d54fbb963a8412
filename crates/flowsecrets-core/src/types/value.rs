//! Secret values as stored and as resolved

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resolved secret value
///
/// Every resolution returns the same nested mapping/sequence/scalar tree,
/// whichever backend produced it.
pub type SecretValue = Value;

/// A secret value as held by a backend, before decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSecretValue {
    /// Text, usually a JSON document; may also be an arbitrary string
    Text(String),
    /// An already-typed value
    Value(Value),
}

impl RawSecretValue {
    /// Decode the raw value, best effort
    ///
    /// Text is parsed as JSON. Text that is not a JSON document comes back as the
    /// original string. Already-typed values pass through untouched.
    pub fn decode(self) -> SecretValue {
        match self {
            RawSecretValue::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::trace!(error = %e, "secret is not a JSON document, returning raw text");
                    Value::String(text)
                }
            },
            RawSecretValue::Value(value) => value,
        }
    }

    /// Whether the raw value is text
    pub fn is_text(&self) -> bool {
        matches!(self, RawSecretValue::Text(_))
    }
}

impl From<String> for RawSecretValue {
    fn from(text: String) -> Self {
        RawSecretValue::Text(text)
    }
}

impl From<&str> for RawSecretValue {
    fn from(text: &str) -> Self {
        RawSecretValue::Text(text.to_string())
    }
}

impl From<Value> for RawSecretValue {
    fn from(value: Value) -> Self {
        RawSecretValue::Value(value)
    }
}
