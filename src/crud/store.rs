//! The document store boundary the CRUD handlers are written against.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::computed::{AttrValue, Properties};
use crate::error::RestError;

/// A stored document: its id within the collection and its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: Properties,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Properties) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A collection query. Filters are equality matches and are all required
/// to hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<String>,
    /// Inclusive cursor on the `order_by` field, or on the document id when
    /// the query is unordered.
    pub start_at: Option<Value>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Equality filters for every JSON entry of `bag`.
    pub fn filters_from(mut self, bag: &Properties) -> Self {
        self.filters.extend(
            bag.iter()
                .filter_map(|(k, v)| v.as_json().map(|j| (k.clone(), j.clone()))),
        );
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn start_at(mut self, cursor: impl Into<Value>) -> Self {
        self.start_at = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An asynchronous document database with named collections.
///
/// `update` merges into an existing document: [`AttrValue::Unset`] removes
/// a field, undefined values are ignored, and a missing document is an
/// error. `set` replaces the document, creating it when needed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RestError>;

    /// Store a new document under a generated id and return the id.
    async fn add(&self, collection: &str, data: Properties) -> Result<String, RestError>;

    async fn set(&self, collection: &str, id: &str, data: Properties) -> Result<(), RestError>;

    async fn update(&self, collection: &str, id: &str, data: Properties)
    -> Result<(), RestError>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RestError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, RestError>;
}

/// Entries a store keeps: JSON values only.
pub(crate) fn storable(data: Properties) -> Properties {
    data.into_iter()
        .filter(|(_, v)| matches!(v, AttrValue::Json(_)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter("role", "admin")
            .order_by("age")
            .start_at(30)
            .limit(5);
        assert_eq!(query.filters, vec![("role".to_string(), json!("admin"))]);
        assert_eq!(query.order_by.as_deref(), Some("age"));
        assert_eq!(query.start_at, Some(json!(30)));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_filters_from_skips_non_json() {
        let bag = Properties::from([
            ("name".to_string(), AttrValue::from("Ada")),
            ("gone".to_string(), AttrValue::Undefined),
            ("removed".to_string(), AttrValue::Unset),
        ]);
        let query = Query::new().filters_from(&bag);
        assert_eq!(query.filters, vec![("name".to_string(), json!("Ada"))]);
    }

    #[test]
    fn test_storable() {
        let bag = Properties::from([
            ("a".to_string(), AttrValue::null()),
            ("b".to_string(), AttrValue::Undefined),
            ("c".to_string(), AttrValue::Unset),
        ]);
        assert_eq!(storable(bag).keys().collect::<Vec<_>>(), ["a"]);
    }
}
