//! Handlers paired with their ordering weight.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::traits::Handler;

/// Priority given to handlers attached without one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// A handler and its priority; lower priorities run first, equal priorities
/// keep attachment order.
#[derive(Clone)]
pub struct PrioritizedHandler {
    handler: Arc<dyn Handler>,
    priority: i32,
}

impl PrioritizedHandler {
    pub fn new(handler: impl Handler + 'static, priority: i32) -> Self {
        Self {
            handler: Arc::new(handler),
            priority,
        }
    }

    pub fn with_default_priority(handler: impl Handler + 'static) -> Self {
        Self::new(handler, DEFAULT_PRIORITY)
    }

    /// Share an already type-erased handler.
    pub fn from_arc(handler: Arc<dyn Handler>, priority: i32) -> Self {
        Self { handler, priority }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }
}

impl Debug for PrioritizedHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PrioritizedHandler")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::handler_fn;
    use crate::types::RequestContext;

    #[test]
    fn test_default_priority() {
        let h = PrioritizedHandler::with_default_priority(handler_fn(
            "noop",
            |_: &mut RequestContext| Ok(()),
        ));
        assert_eq!(h.priority(), DEFAULT_PRIORITY);
        assert_eq!(h.name(), "noop");
    }

    #[test]
    fn test_clone_shares_handler() {
        let h = PrioritizedHandler::new(handler_fn("noop", |_: &mut RequestContext| Ok(())), 3);
        let copy = h.clone();
        assert!(Arc::ptr_eq(h.handler(), copy.handler()));
        assert_eq!(format!("{copy:?}"), r#"PrioritizedHandler { name: "noop", priority: 3 }"#);
    }
}
