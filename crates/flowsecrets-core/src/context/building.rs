//! Per-thread flow-building marker
//!
//! For hosts that keep one shared [`ExecutionContext`] but build flows on
//! several threads. A thread that enters a flow definition only marks itself;
//! contexts taken on other threads are unaffected.

use std::cell::RefCell;

use super::ExecutionContext;

thread_local! {
    static BUILDING_FLOW: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Mark the current thread as building `flow`
///
/// Returns the previous marker, to be handed back to [`restore_building_flow`].
pub fn enter_building_flow(flow: impl Into<String>) -> Option<String> {
    BUILDING_FLOW.with(|b| b.replace(Some(flow.into())))
}

/// Restore the marker saved by [`enter_building_flow`]
pub fn restore_building_flow(previous: Option<String>) {
    BUILDING_FLOW.with(|b| *b.borrow_mut() = previous);
}

/// The flow the current thread is building, if any
pub fn current_building_flow() -> Option<String> {
    BUILDING_FLOW.with(|b| b.borrow().clone())
}

impl ExecutionContext {
    /// Clone this context with the current thread's building marker applied
    ///
    /// A marker already set on the context is kept when the thread has none.
    pub fn for_current_thread(&self) -> Self {
        let mut context = self.clone();
        if let Some(flow) = current_building_flow() {
            context.set_building_flow(Some(flow));
        }
        context
    }
}
