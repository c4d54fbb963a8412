//! Execution context passed to secret resolution

use std::sync::Arc;

use crate::config::SecretsConfig;
use crate::secrets::LocalSecretStore;

/// State the flow runner establishes before any secret is resolved
///
/// Cloning is cheap: the local store is shared, not copied.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Name of the flow whose definition is being built, if any
    building_flow: Option<String>,
    /// Local secrets visible to this run
    secrets: Option<Arc<LocalSecretStore>>,
}

impl ExecutionContext {
    /// Create an empty run context: not building, no local secrets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with the local secrets from configuration
    pub fn from_config(config: &SecretsConfig) -> Self {
        let store = LocalSecretStore::with_secrets(config.context.secrets.clone());
        Self::new().with_secrets(Arc::new(store))
    }

    /// Attach a local secret store
    pub fn with_secrets(mut self, secrets: Arc<LocalSecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Mark the context as building the definition of `flow`
    pub fn building(mut self, flow: impl Into<String>) -> Self {
        self.building_flow = Some(flow.into());
        self
    }

    /// Set or clear the flow-building marker in place
    pub fn set_building_flow(&mut self, flow: Option<String>) {
        self.building_flow = flow;
    }

    /// The flow currently being built, if any
    pub fn building_flow(&self) -> Option<&str> {
        self.building_flow.as_deref()
    }

    /// Whether a flow definition is being built
    pub fn is_building(&self) -> bool {
        self.building_flow.is_some()
    }

    /// The local secret store, if the runner supplied one
    pub fn secrets(&self) -> Option<&Arc<LocalSecretStore>> {
        self.secrets.as_ref()
    }
}
