//! Execution context and the secret access guard
//!
//! The context is owned by the flow runner and passed to every resolution.
//! It records whether a flow definition is currently being built and which
//! local secrets the run can see.

mod building;
mod execution;
mod guard;

pub use building::{current_building_flow, enter_building_flow, restore_building_flow};
pub use execution::ExecutionContext;
pub use guard::{check_access_allowed, ContextViolation};
