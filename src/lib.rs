// src/lib.rs
pub use computed::{AliasScheme, AttrValue, Computed, EntitySchema, Properties, build_computed};
pub use config::EngineConfig;
pub use crud::{CrudConfig, DocumentStore, MemoryStore, StoreCrud};
pub use engine::RestEngine;
pub use error::RestError;
pub use routing::RoutingTree;
pub use traits::{FnHandler, Handler, HandlerResult, handler_fn};
pub use types::{
    EntityPath, Method, PrioritizedHandler, RequestContext, RestRequest, RestResponse,
};

pub mod computed;
pub mod config;
pub mod crud;
mod engine;
mod error;
pub mod metrics;
mod routing;
mod timers;
mod traits;
pub mod types;
