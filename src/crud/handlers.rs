//! CRUD handlers over a [`DocumentStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};
use tracing::debug;

use crate::computed::{
    AttrValue, Computed, Properties, filter_empty_computed, keys_match, properties_to_json,
    set_to_all_empty_fields,
};
use crate::engine::RestEngine;
use crate::error::RestError;
use crate::traits::{Handler, HandlerResult};
use crate::types::{Method, PrioritizedHandler, RequestContext, status};

use super::search_meta::{DEFAULT_LIMIT, SearchMeta};
use super::store::{Document, DocumentStore};

/// Priority of the store-backed handlers; guards and decorators attached at
/// the default priority run before them.
pub const CRUD_PRIORITY: i32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrudConfig {
    pub priority: i32,
    /// Page size for collection reads without a usable `limit`.
    pub default_limit: usize,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            priority: CRUD_PRIORITY,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl CrudConfig {
    pub fn from_json_str(text: &str) -> Result<Self, RestError> {
        let config: CrudConfig = serde_json::from_str(text)?;
        if config.default_limit == 0 {
            return Err(RestError::InvalidConfig(
                "default_limit must be greater than zero".into(),
            ));
        }
        Ok(config)
    }
}

/// The five store operations and the method each one serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CrudOp {
    Find,
    Upsert,
    Update,
    Patch,
    Delete,
}

impl CrudOp {
    pub fn method(self) -> Method {
        match self {
            CrudOp::Find => Method::Get,
            CrudOp::Upsert => Method::Post,
            CrudOp::Update => Method::Put,
            CrudOp::Patch => Method::Patch,
            CrudOp::Delete => Method::Delete,
        }
    }
}

/// Produces store-backed handlers for registered entities.
///
/// ```rust,ignore
/// let crud = StoreCrud::new(Arc::new(MemoryStore::new()));
/// let mut engine = RestEngine::default();
/// crud.attach_entity(&mut engine, Computed::new(user_schema))?;
/// ```
pub struct StoreCrud<S> {
    store: Arc<S>,
    config: CrudConfig,
}

impl<S> StoreCrud<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, CrudConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: CrudConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    pub fn handler(&self, op: CrudOp) -> PrioritizedHandler {
        PrioritizedHandler::new(
            CrudHandler {
                op,
                name: format!("crud:{op}"),
                store: Arc::clone(&self.store),
                config: self.config.clone(),
            },
            self.config.priority,
        )
    }

    /// Register `prototype` and attach one handler per operation.
    pub fn attach_entity(
        &self,
        engine: &mut RestEngine,
        prototype: Computed,
    ) -> Result<(), RestError> {
        engine.add_entity(prototype.clone())?;
        for op in CrudOp::iter() {
            engine.add_middleware(&prototype, op.method(), self.handler(op));
        }
        Ok(())
    }
}

struct CrudHandler<S> {
    op: CrudOp,
    name: String,
    store: Arc<S>,
    config: CrudConfig,
}

#[async_trait]
impl<S> Handler for CrudHandler<S>
where
    S: DocumentStore + 'static,
{
    async fn handle(&self, ctx: &mut RequestContext) -> HandlerResult {
        let entity = segment(Some(ctx.request().entity.as_str()), "entity")?;
        let collection = ctx.path().to_collection();
        let prototype = ctx.prototype().cloned();
        debug!(
            event = "Crud",
            phase = self.op.as_ref(),
            entity = %entity,
            collection = %collection
        );

        match self.op {
            CrudOp::Find => self.find(ctx, &collection, prototype.as_ref()).await,
            CrudOp::Upsert => self.upsert(ctx, &collection, prototype.as_ref()).await,
            CrudOp::Update => self.update(ctx, &collection, prototype.as_ref()).await,
            CrudOp::Patch => self.patch(ctx, &collection, prototype.as_ref()).await,
            CrudOp::Delete => self.delete(ctx, &collection).await,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<S> CrudHandler<S>
where
    S: DocumentStore + 'static,
{
    async fn find(
        &self,
        ctx: &mut RequestContext,
        collection: &str,
        prototype: Option<&Computed>,
    ) -> HandlerResult {
        let records = match ctx.request().id.clone().filter(|id| !id.is_empty()) {
            Some(id) => match self.store.get(collection, &id).await? {
                Some(doc) => vec![record(prototype, doc)?],
                None => Vec::new(),
            },
            None => {
                let params = ctx.params();
                let (meta, rest) = SearchMeta::split(&params, self.config.default_limit);
                let filters = filter_empty_computed(&map_input(prototype, &rest)?);
                let query = meta.to_query().filters_from(&filters);
                self.store
                    .query(collection, &query)
                    .await?
                    .into_iter()
                    .map(|doc| record(prototype, doc))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let code = if records.is_empty() {
            status::NOT_FOUND
        } else {
            status::OK
        };
        ctx.response_mut().respond(code, Value::Array(records));
        Ok(())
    }

    async fn upsert(
        &self,
        ctx: &mut RequestContext,
        collection: &str,
        prototype: Option<&Computed>,
    ) -> HandlerResult {
        let params = ctx.params();
        let id = params
            .get("id")
            .and_then(AttrValue::as_str)
            .filter(|id| !id.is_empty())
            .map(String::from);
        let (_, rest) = SearchMeta::split(&params, self.config.default_limit);
        let data = map_input(prototype, &rest)?;

        let (id, code) = match id {
            None => (self.store.add(collection, data).await?, status::CREATED),
            Some(id) if self.store.get(collection, &id).await?.is_some() => {
                self.store
                    .update(collection, &id, filter_empty_computed(&data))
                    .await?;
                (id, status::OK)
            }
            Some(id) => {
                self.store.set(collection, &id, data).await?;
                (id, status::CREATED)
            }
        };

        let body = self.reread(collection, &id, prototype).await?;
        ctx.response_mut().respond(code, body);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &mut RequestContext,
        collection: &str,
        prototype: Option<&Computed>,
    ) -> HandlerResult {
        let id = segment(ctx.request().id.as_deref(), "id")?;
        let prototype = prototype.ok_or_else(|| {
            RestError::bad_request("Bad entity name. Add this entity to rest CRUD.")
        })?;

        // A client key that fuzzily names a field replaces that field's default.
        let params = ctx.params();
        let mut merged: Properties = prototype
            .to_object(false)
            .into_iter()
            .filter(|(field, _)| !params.keys().any(|key| keys_match(key, field)))
            .collect();
        merged.extend(params);
        let (_, rest) = SearchMeta::split(&merged, self.config.default_limit);
        let data = map_input(Some(prototype), &rest)?;

        self.ensure_exists(collection, &id).await?;
        self.store
            .update(
                collection,
                &id,
                set_to_all_empty_fields(&data, AttrValue::Unset),
            )
            .await?;

        let body = self.reread(collection, &id, Some(prototype)).await?;
        ctx.response_mut().respond(status::OK, body);
        Ok(())
    }

    async fn patch(
        &self,
        ctx: &mut RequestContext,
        collection: &str,
        prototype: Option<&Computed>,
    ) -> HandlerResult {
        let id = segment(ctx.request().id.as_deref(), "id")?;
        let (_, rest) = SearchMeta::split(&ctx.params(), self.config.default_limit);

        self.ensure_exists(collection, &id).await?;
        self.store
            .update(collection, &id, filter_empty_computed(&rest))
            .await?;

        let body = self.reread(collection, &id, prototype).await?;
        ctx.response_mut().respond(status::OK, body);
        Ok(())
    }

    async fn delete(&self, ctx: &mut RequestContext, collection: &str) -> HandlerResult {
        let id = segment(ctx.request().id.as_deref(), "id")?;
        self.store.delete(collection, &id).await?;
        ctx.response_mut().set_status(status::NO_CONTENT);
        Ok(())
    }

    async fn ensure_exists(&self, collection: &str, id: &str) -> HandlerResult {
        match self.store.get(collection, id).await? {
            Some(_) => Ok(()),
            None => Err(RestError::bad_request("Resource doesn't exist")),
        }
    }

    async fn reread(
        &self,
        collection: &str,
        id: &str,
        prototype: Option<&Computed>,
    ) -> Result<Value, RestError> {
        let doc = self.store.get(collection, id).await?.ok_or_else(|| {
            RestError::Store(format!("Document {collection}/{id} is gone after write"))
        })?;
        record(prototype, doc)
    }
}

fn segment(value: Option<&str>, name: &str) -> Result<String, RestError> {
    value
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| RestError::bad_request(format!("Empty required part of path `{name}`")))
}

/// Shape inbound data with the request's prototype: `input`, validate, then
/// the full field snapshot. Without a prototype the bag passes through.
fn map_input(prototype: Option<&Computed>, data: &Properties) -> Result<Properties, RestError> {
    let Some(prototype) = prototype else {
        return Ok(data.clone());
    };
    let mut target = prototype.clone();
    target.input(data);
    if !target.validate() {
        return Err(RestError::bad_request("Invalid params."));
    }
    Ok(target.to_object(false))
}

/// Shape stored data for a response: `set_props`, validate, then the
/// external projection.
fn map_output(prototype: Option<&Computed>, data: &Properties) -> Result<Properties, RestError> {
    let Some(prototype) = prototype else {
        return Ok(data.clone());
    };
    let mut target = prototype.clone();
    target.set_props(data);
    if !target.validate() {
        return Err(RestError::bad_request("Invalid params."));
    }
    Ok(target.output())
}

/// `{id, ...output}` for one document.
fn record(prototype: Option<&Computed>, doc: Document) -> Result<Value, RestError> {
    let mut out = map_output(prototype, &doc.data)?;
    out.insert("id".into(), AttrValue::from(doc.id));
    Ok(properties_to_json(&out))
}
