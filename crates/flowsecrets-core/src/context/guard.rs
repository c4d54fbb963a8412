//! Guard against reading secrets outside a flow run

use thiserror::Error;

use super::execution::ExecutionContext;

/// A secret was requested while a flow definition was being built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Secrets should only be retrieved during a flow run, not while building flow '{flow}'")]
pub struct ContextViolation {
    /// The flow whose definition was being built
    pub flow: String,
}

/// Check that the context allows secret access
pub fn check_access_allowed(context: &ExecutionContext) -> Result<(), ContextViolation> {
    match context.building_flow() {
        Some(flow) => Err(ContextViolation { flow: flow.to_string() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_context_allowed() {
        assert!(check_access_allowed(&ExecutionContext::new()).is_ok());
    }

    #[test]
    fn test_building_context_rejected() {
        let context = ExecutionContext::new().building("nightly");
        let err = check_access_allowed(&context).unwrap_err();
        assert_eq!(err.flow, "nightly");
        assert!(err.to_string().contains("during a flow run"));
    }
}
