//! In-memory local secret store

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::types::RawSecretValue;

/// Local secrets for a flow run
///
/// The flow runner populates the store before the run starts; resolution only
/// ever reads from it. A missing name is an ordinary answer (`None`), not an error.
///
/// # Thread Safety
///
/// The store uses a `RwLock` internally and is safe to share between threads.
///
/// # Example
///
/// ```
/// use flowsecrets_core::LocalSecretStore;
///
/// let store = LocalSecretStore::new();
/// store.insert("db_pw", "\"s3cr3t\"");
/// assert!(store.contains("db_pw"));
/// ```
#[derive(Default)]
pub struct LocalSecretStore {
    secrets: RwLock<HashMap<String, RawSecretValue>>,
}

impl LocalSecretStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            secrets: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with initial values
    pub fn with_secrets(initial: HashMap<String, RawSecretValue>) -> Self {
        Self {
            secrets: RwLock::new(initial),
        }
    }

    /// Look up the raw value stored under `name`
    pub fn get(&self, name: &str) -> Option<RawSecretValue> {
        self.secrets.read().get(name).cloned()
    }

    /// Check if a secret exists
    pub fn contains(&self, name: &str) -> bool {
        self.secrets.read().contains_key(name)
    }

    /// Add or replace a secret
    pub fn insert(&self, name: impl Into<String>, value: impl Into<RawSecretValue>) {
        self.secrets.write().insert(name.into(), value.into());
    }

    /// Add or replace several secrets at once
    pub fn extend<I>(&self, secrets: I)
    where
        I: IntoIterator<Item = (String, RawSecretValue)>,
    {
        self.secrets.write().extend(secrets);
    }

    /// Remove a secret, returning its raw value
    pub fn remove(&self, name: &str) -> Option<RawSecretValue> {
        self.secrets.write().remove(name)
    }

    /// Clear all secrets from the store
    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    /// Names of all stored secrets, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.secrets.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of secrets in the store
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for LocalSecretStore {
    fn clone(&self) -> Self {
        Self {
            secrets: RwLock::new(self.secrets.read().clone()),
        }
    }
}

// Values stay out of debug output
impl fmt::Debug for LocalSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSecretStore")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_lookup() {
        let store = LocalSecretStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("missing"), None);

        store.insert("token", "abc");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("token"), Some(RawSecretValue::Text("abc".to_string())));

        store.insert("token", json!({"k": "v"}));
        assert_eq!(store.get("token"), Some(RawSecretValue::Value(json!({"k": "v"}))));

        assert!(store.remove("token").is_some());
        assert!(!store.contains("token"));
    }

    #[test]
    fn test_store_with_initial() {
        let mut initial = HashMap::new();
        initial.insert("b".to_string(), RawSecretValue::from("2"));
        initial.insert("a".to_string(), RawSecretValue::from("1"));

        let store = LocalSecretStore::with_secrets(initial);
        assert_eq!(store.names(), vec!["a".to_string(), "b".to_string()]);

        store.extend(vec![("c".to_string(), RawSecretValue::from("3"))]);
        assert_eq!(store.len(), 3);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_debug_hides_values() {
        let store = LocalSecretStore::new();
        store.insert("db_pw", "hunter2");

        let debug = format!("{:?}", store);
        assert!(debug.contains("db_pw"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_clone_is_independent() {
        let store = LocalSecretStore::new();
        store.insert("key", "value");

        let cloned = store.clone();
        cloned.insert("key", "modified");
        assert_eq!(store.get("key"), Some(RawSecretValue::from("value")));
    }

    #[test]
    fn test_concurrent_readers() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(LocalSecretStore::new());
        store.insert("shared", "1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get("shared"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(RawSecretValue::from("1")));
        }
    }
}
