use async_trait::async_trait;

use crate::error::RestError;
use crate::types::RequestContext;

/// Outcome of one handler step: `Ok(())` continues the chain, `Err` aborts
/// it with that error.
pub type HandlerResult = Result<(), RestError>;

/// A unit of per-route behavior.
///
/// Handlers run strictly one after another for a given request; a handler
/// may suspend on I/O but never overlaps another handler of the same chain.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult;

    /// Name used in logs, the type name by default
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A synchronous closure as a handler.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync,
{
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        (self.f)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a closure that needs no I/O, e.g. a guard or a response decorator.
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
    }
}
