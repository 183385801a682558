use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::computed::{AttrValue, EntitySchema, Properties};
use crate::traits::{Handler, handler_fn};
use crate::types::{DEFAULT_PRIORITY, status};
use async_trait::async_trait;
use serde_json::json;

mod registration;

type Trace = Arc<Mutex<Vec<String>>>;

fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

fn traced(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

fn user_entity() -> Computed {
    let schema = EntitySchema::builder("User")
        .undefined_field("name")
        .field("role", "member")
        .build()
        .unwrap();
    Computed::new(schema)
}

fn registered_engine(config: EngineConfig) -> (RestEngine, Computed) {
    let entity = user_entity();
    let mut engine = RestEngine::new(config);
    engine.add_entity(entity.clone()).unwrap();
    (engine, entity)
}

/// Appends its name to the trace and continues.
fn recorder(trace: &Trace, name: &str, priority: i32) -> PrioritizedHandler {
    let trace = Arc::clone(trace);
    let label = name.to_string();
    PrioritizedHandler::new(
        handler_fn(name, move |_: &mut RequestContext| {
            trace.lock().unwrap().push(label.clone());
            Ok(())
        }),
        priority,
    )
}

/// Records itself, then aborts the chain with `error`.
fn failing(trace: &Trace, name: &str, priority: i32, error: RestError) -> PrioritizedHandler {
    let trace = Arc::clone(trace);
    let label = name.to_string();
    PrioritizedHandler::new(
        handler_fn(name, move |_: &mut RequestContext| {
            trace.lock().unwrap().push(label.clone());
            Err(error.clone())
        }),
        priority,
    )
}

/// Writes `{"by": name}` with the given status.
fn responder(name: &str, priority: i32, code: u16) -> PrioritizedHandler {
    let label = name.to_string();
    PrioritizedHandler::new(
        handler_fn(name, move |ctx: &mut RequestContext| {
            ctx.response_mut().respond(code, json!({ "by": label }));
            Ok(())
        }),
        priority,
    )
}

/// Never finishes on its own.
struct Stalled;

#[async_trait]
impl Handler for Stalled {
    async fn handle(&self, _ctx: &mut RequestContext) -> HandlerResult {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "stalled"
    }
}
