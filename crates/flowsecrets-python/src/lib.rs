//! Python bindings for flowsecrets via PyO3
//!
//! ```python
//! import flowsecrets
//!
//! flowsecrets.set_local_secret("db_pw", '"s3cr3t"')
//! flowsecrets.Secret("db_pw").get()   # 's3cr3t'
//!
//! with flowsecrets.building_flow("etl"):
//!     flowsecrets.Secret("db_pw").get()   # ValueError
//! ```
//!
//! Configuration and local secrets are shared by the whole interpreter. The
//! `building_flow` marker belongs to the thread that entered it, so building a
//! flow on one thread never blocks a run on another. Each `get()` builds a fresh
//! resolver from the shared state.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;

use flowsecrets_core::context::{enter_building_flow, restore_building_flow};
use flowsecrets_core::{
    ExecutionContext, LocalSecretStore, RawSecretValue, ResolutionError, SecretResolver,
    SecretValue, SecretsConfig,
    Secret as CoreSecret,
};

create_exception!(flowsecrets, ClientError, PyException, "The secret service could not be queried.");

// ============================================================================
// Process-wide state
// ============================================================================

struct BindingState {
    config: SecretsConfig,
    context: ExecutionContext,
}

impl BindingState {
    fn load() -> Self {
        flowsecrets_core::logging::init();

        let config = SecretsConfig::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            SecretsConfig::default()
        });
        let context = ExecutionContext::from_config(&config);

        Self { config, context }
    }

    fn store(&self) -> Option<&Arc<LocalSecretStore>> {
        self.context.secrets()
    }
}

static STATE: Lazy<RwLock<BindingState>> = Lazy::new(|| RwLock::new(BindingState::load()));

fn to_py_err(err: ResolutionError) -> PyErr {
    match err {
        ResolutionError::Client(e) => ClientError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn to_python(py: Python<'_>, value: &SecretValue) -> PyResult<PyObject> {
    let text = serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let json = py.import("json")?;
    Ok(json.call_method1("loads", (text,))?.unbind())
}

fn from_python(value: &Bound<'_, PyAny>) -> PyResult<RawSecretValue> {
    if let Ok(text) = value.extract::<String>() {
        return Ok(RawSecretValue::Text(text));
    }

    let json = value.py().import("json")?;
    let text: String = json.call_method1("dumps", (value,))?.extract()?;
    let typed = serde_json::from_str(&text).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(RawSecretValue::Value(typed))
}

// ============================================================================
// Secret
// ============================================================================

/// A named secret whose value is resolved on `get()`
#[pyclass(name = "Secret")]
pub struct Secret {
    inner: CoreSecret,
}

#[pymethods]
impl Secret {
    #[new]
    pub fn new(name: String) -> Self {
        Self { inner: CoreSecret::new(name) }
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    /// Resolve the value
    ///
    /// Raises ValueError while a flow is being built or when a local secret is
    /// missing, and ClientError when the secret service fails.
    pub fn get(&self, py: Python<'_>) -> PyResult<PyObject> {
        let (resolver, context) = {
            let state = STATE.read();
            let resolver = SecretResolver::from_config(&state.config)
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
            (resolver, state.context.for_current_thread())
        };

        let value = py
            .allow_threads(|| self.inner.get(&resolver, &context))
            .map_err(to_py_err)?;
        to_python(py, &value)
    }

    fn __repr__(&self) -> String {
        format!("Secret(name='{}')", self.inner.name())
    }
}

// ============================================================================
// Flow building marker
// ============================================================================

/// Context manager marking that a flow definition is being built
#[pyclass(name = "building_flow")]
pub struct BuildingFlow {
    flow: String,
    previous: Option<String>,
}

#[pymethods]
impl BuildingFlow {
    #[new]
    pub fn new(flow: String) -> Self {
        Self { flow, previous: None }
    }

    fn __enter__(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.previous = enter_building_flow(slf.flow.clone());
        slf
    }

    fn __exit__(&self, _exc_type: PyObject, _exc_value: PyObject, _traceback: PyObject) -> bool {
        restore_building_flow(self.previous.clone());
        false
    }

    fn __repr__(&self) -> String {
        format!("building_flow('{}')", self.flow)
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Choose between local secrets and the secret service
#[pyfunction]
fn set_use_local_secrets(enabled: bool) {
    STATE.write().config.use_local_secrets = enabled;
}

/// Whether local secrets are in use
#[pyfunction]
fn use_local_secrets() -> bool {
    STATE.read().config.use_local_secrets
}

/// Add or replace a local secret
///
/// Strings are stored as-is and decoded as JSON on `get()`. Other values must be
/// JSON-serializable: they go through `json.dumps` and are stored already typed.
/// `bytes` raises TypeError and values outside strict JSON, such as
/// `float("nan")`, raise ValueError. Decode bytes to `str` first.
#[pyfunction]
fn set_local_secret(name: String, value: &Bound<'_, PyAny>) -> PyResult<()> {
    let raw = from_python(value)?;
    if let Some(store) = STATE.read().store() {
        store.insert(name, raw);
    }
    Ok(())
}

/// Remove all local secrets
#[pyfunction]
fn clear_local_secrets() {
    if let Some(store) = STATE.read().store() {
        store.clear();
    }
}

/// Names of the local secrets
#[pyfunction]
fn list_local_secrets() -> Vec<String> {
    STATE.read().store().map(|store| store.names()).unwrap_or_default()
}

/// Reload configuration and local secrets from file and environment
#[pyfunction]
fn reload_config() {
    *STATE.write() = BindingState::load();
}

#[pymodule]
fn flowsecrets(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<Secret>()?;
    m.add_class::<BuildingFlow>()?;
    m.add("ClientError", m.py().get_type::<ClientError>())?;

    // Functions
    m.add_function(wrap_pyfunction!(set_use_local_secrets, m)?)?;
    m.add_function(wrap_pyfunction!(use_local_secrets, m)?)?;
    m.add_function(wrap_pyfunction!(set_local_secret, m)?)?;
    m.add_function(wrap_pyfunction!(clear_local_secrets, m)?)?;
    m.add_function(wrap_pyfunction!(list_local_secrets, m)?)?;
    m.add_function(wrap_pyfunction!(reload_config, m)?)?;

    Ok(())
}
