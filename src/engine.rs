use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::computed::Computed;
use crate::config::{EngineConfig, GENERIC_INTERNAL_ERROR};
use crate::error::RestError;
use crate::metrics::{
    DispatchPhases, DispatchStats, MetricsSink, RegistrationStats, noop_sink,
};
use crate::routing::RoutingTree;
use crate::timers::{PhaseTimer, as_millis_f64};
use crate::traits::HandlerResult;
use crate::types::{
    EntityPath, ErrorBody, Method, PrioritizedHandler, RequestContext, RestRequest,
    RestResponse,
};

/// The dispatch engine.
///
/// Registration (`add_entity`, `attach_rules`, `add_middleware`) takes
/// `&mut self` and belongs to startup. Once built, share the engine (e.g.
/// in an `Arc`) and serve with [`RestEngine::dispatch`], which only needs
/// `&self`, so the routing tree and registry are read-only during traffic.
#[derive(Clone)]
pub struct RestEngine {
    tree: RoutingTree,
    prototypes: HashMap<EntityPath, Computed>,
    config: EngineConfig,
    sink: Arc<dyn MetricsSink>,
}

impl Debug for RestEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut paths: Vec<_> = self.prototypes.keys().map(EntityPath::as_str).collect();
        paths.sort_unstable();
        f.debug_struct("RestEngine")
            .field("paths", &paths)
            .field("tree", &self.tree)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RestEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RestEngine {
    pub fn new(config: EngineConfig) -> Self {
        RestEngine {
            tree: RoutingTree::new(),
            prototypes: HashMap::new(),
            config,
            sink: noop_sink(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_metrics_sink(&mut self, sink: Arc<dyn MetricsSink>) -> &mut Self {
        self.sink = sink;
        self
    }

    /// Register `entity` as the prototype of its derived path and open the
    /// path's `all` bucket. A path can only be registered once; a failed
    /// call leaves the engine untouched.
    pub fn add_entity(&mut self, entity: Computed) -> Result<&mut Self, RestError> {
        let path = entity.schema().path();
        if self.prototypes.contains_key(&path) {
            return Err(RestError::PathExists(path.to_string()));
        }

        info!(
            event = "Registration",
            phase = "Entity",
            path = %path,
            type_name = entity.type_name()
        );

        self.tree.open(Method::All, &path);
        self.sink.on_registration(&RegistrationStats {
            path: path.to_string(),
            registered_at: SystemTime::now(),
        });
        self.prototypes.insert(path, entity);
        Ok(self)
    }

    /// Append every handler to every `(method, path)` bucket, in order.
    pub fn attach_rules(
        &mut self,
        entity: &Computed,
        methods: &[Method],
        handlers: &[PrioritizedHandler],
    ) -> &mut Self {
        for method in methods {
            for handler in handlers {
                self.add_middleware(entity, *method, handler.clone());
            }
        }
        self
    }

    pub fn add_middleware(
        &mut self,
        entity: &Computed,
        method: Method,
        handler: PrioritizedHandler,
    ) -> &mut Self {
        let path = entity.schema().path();
        debug!(
            event = "Registration",
            phase = "Handler",
            path = %path,
            method = %method,
            priority = handler.priority(),
            handler = handler.name()
        );
        self.tree.push(method, &path, handler);
        self
    }

    /// A private copy of the prototype registered for `path`.
    pub fn entity_prototype(&self, path: &str) -> Option<Computed> {
        self.prototypes.get(path).cloned()
    }

    pub fn paths(&self) -> impl Iterator<Item = &EntityPath> {
        self.prototypes.keys()
    }

    pub fn routing_tree(&self) -> &RoutingTree {
        &self.tree
    }

    /// Route one request through its handler chain.
    ///
    /// Handlers run strictly in sequence; the first error aborts the chain
    /// and is turned into `{"error": message}` with a 400 for client errors
    /// and a 500 otherwise. The returned response is final. If no handler
    /// wrote anything it stays unhandled so the host router can fall
    /// through.
    pub async fn dispatch(&self, request: RestRequest) -> RestResponse {
        let started = Instant::now();
        let mut routing = Duration::ZERO;
        let mut running = Duration::ZERO;
        let method = request.method.clone();

        let (chain, mut ctx) = {
            let _timer = PhaseTimer::new(&mut routing);
            let path = EntityPath::from_segment(&request.entity);
            let chain = self.tree.chain(request.method_kind(), path.as_str());
            let prototype = self.entity_prototype(path.as_str());
            (chain, RequestContext::new(request, path, prototype))
        };

        debug!(
            event = "Dispatch",
            phase = "Routing",
            method = %method,
            path = %ctx.path(),
            handlers = chain.len(),
            registered = ctx.prototype().is_some()
        );

        let (handlers_run, outcome) = {
            let _timer = PhaseTimer::new(&mut running);
            self.run_chain(&chain, &mut ctx).await
        };

        let aborted = outcome.is_err();
        if let Err(err) = outcome {
            self.respond_with_error(&mut ctx, &err);
        } else if !ctx.response().is_handled() {
            debug!(event = "Dispatch", phase = "Unhandled", path = %ctx.path());
        }

        let stats = DispatchStats {
            method,
            path: ctx.path().to_string(),
            status: ctx.response().status(),
            handlers_run,
            aborted,
            duration: started.elapsed(),
        };
        let phases = DispatchPhases {
            routing_ms: as_millis_f64(routing),
            handlers_ms: as_millis_f64(running),
            total_ms: as_millis_f64(stats.duration),
        };
        self.sink.on_dispatch(&stats);
        self.sink.on_dispatch_phases(&stats, &phases);

        debug!(
            event = "Dispatch",
            phase = "Completed",
            status = ?stats.status,
            handlers_run,
            aborted
        );

        ctx.into_response()
    }

    /// Run the chain until it ends or aborts. Returns how many handlers
    /// completed successfully.
    async fn run_chain(
        &self,
        chain: &[PrioritizedHandler],
        ctx: &mut RequestContext,
    ) -> (usize, HandlerResult) {
        for (index, entry) in chain.iter().enumerate() {
            debug!(
                event = "Dispatch",
                phase = "Handler",
                index,
                priority = entry.priority(),
                handler = entry.name()
            );
            if let Err(err) = self.run_step(index, entry, ctx).await {
                return (index, Err(err));
            }
        }
        (chain.len(), Ok(()))
    }

    /// One handler step, with panics and the optional timeout guard turned
    /// into errors.
    async fn run_step(
        &self,
        index: usize,
        entry: &PrioritizedHandler,
        ctx: &mut RequestContext,
    ) -> HandlerResult {
        let step = AssertUnwindSafe(entry.handler().handle(ctx)).catch_unwind();
        let caught = match self.config.handler_timeout() {
            Some(limit) => tokio::time::timeout(limit, step).await.map_err(|_| {
                RestError::MissingCompletion {
                    index,
                    priority: entry.priority(),
                    timeout_ms: limit.as_millis() as u64,
                }
            })?,
            None => step.await,
        };
        caught.unwrap_or_else(|payload| {
            Err(RestError::HandlerPanicked(panic_message(payload.as_ref())))
        })
    }

    fn respond_with_error(&self, ctx: &mut RequestContext, err: &RestError) {
        let status = err.status_code();
        if err.is_client_error() {
            warn!(
                event = "Dispatch",
                phase = "Abort",
                path = %ctx.path(),
                status,
                error = %err
            );
        } else {
            error!(
                event = "Dispatch",
                phase = "Abort",
                path = %ctx.path(),
                status,
                error = %err
            );
        }

        let message = if err.is_client_error() || self.config.expose_internal_errors {
            err.to_string()
        } else {
            GENERIC_INTERNAL_ERROR.to_string()
        };
        ctx.response_mut()
            .respond(status, ErrorBody::new(message).into_json());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests;
