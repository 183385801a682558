//! In-process [`DocumentStore`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

use crate::computed::{AttrValue, Properties};
use crate::error::RestError;

use super::store::{Document, DocumentStore, Query, storable};

type Collection = BTreeMap<String, Properties>;

/// Documents kept in memory, keyed by collection then id. Generated ids are
/// simple-format v4 UUIDs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RestError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn add(&self, collection: &str, data: Properties) -> Result<String, RestError> {
        let id = Uuid::new_v4().simple().to_string();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Properties) -> Result<(), RestError> {
        trace!(event = "Store", phase = "Set", collection, id);
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), storable(data));
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Properties,
    ) -> Result<(), RestError> {
        trace!(event = "Store", phase = "Update", collection, id);
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| RestError::Store(format!("No document to update: {collection}/{id}")))?;

        for (key, value) in data {
            match value {
                AttrValue::Unset => {
                    doc.remove(&key);
                }
                AttrValue::Undefined => {}
                json @ AttrValue::Json(_) => {
                    doc.insert(key, json);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RestError> {
        trace!(event = "Store", phase = "Delete", collection, id);
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, RestError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Document> = docs
            .iter()
            .filter(|(_, data)| {
                query.filters.iter().all(|(field, expected)| {
                    data.get(field).and_then(AttrValue::as_json) == Some(expected)
                })
            })
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect();

        if let Some(field) = &query.order_by {
            // Documents without the ordering field never match an ordered query.
            found.retain(|doc| doc.data.get(field).and_then(AttrValue::as_json).is_some());
            found.sort_by(|a, b| compare_values(&field_of(a, field), &field_of(b, field)));
        }

        if let Some(cursor) = &query.start_at {
            found.retain(|doc| {
                let key = match &query.order_by {
                    Some(field) => field_of(doc, field),
                    None => Value::String(doc.id.clone()),
                };
                compare_values(&key, cursor) != Ordering::Less
            });
        }

        if let Some(limit) = query.limit {
            found.truncate(limit);
        }

        trace!(
            event = "Store",
            phase = "Query",
            collection,
            matched = found.len()
        );
        Ok(found)
    }
}

fn field_of(doc: &Document, field: &str) -> Value {
    doc.data
        .get(field)
        .and_then(AttrValue::as_json)
        .cloned()
        .unwrap_or(Value::Null)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type first (null, bool, number, string,
/// array, object), then by value for scalars.
pub(crate) fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}
