//! Paging and ordering parameters mixed into CRUD query strings.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::computed::{AttrValue, Computed, EntitySchema, Properties, keys_match};

use super::store::Query;

/// Page size used when a request gives none.
pub const DEFAULT_LIMIT: usize = 100;

static SEARCH_META_SCHEMA: Lazy<Arc<EntitySchema>> = Lazy::new(|| {
    EntitySchema::builder("SearchMeta")
        .undefined_field("orderBy")
        .undefined_field("start")
        .field("limit", DEFAULT_LIMIT as u64)
        .build()
        .expect("SearchMeta schema is valid")
});

/// `orderBy`, `start` and `limit`, read fuzzily from a parameter bag.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMeta {
    pub order_by: Option<String>,
    pub start: Option<Value>,
    pub limit: usize,
}

impl Default for SearchMeta {
    fn default() -> Self {
        Self {
            order_by: None,
            start: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchMeta {
    pub fn schema() -> Arc<EntitySchema> {
        Arc::clone(&SEARCH_META_SCHEMA)
    }

    /// Separate search meta from the rest of `params`.
    ///
    /// The returned bag has every key matching a meta field removed, along
    /// with the `entity` and `id` route segments. A missing, zero or
    /// unparsable limit becomes `default_limit`.
    pub fn split(params: &Properties, default_limit: usize) -> (SearchMeta, Properties) {
        let schema = Self::schema();
        let mut meta = Computed::new(Arc::clone(&schema));
        meta.set_props(params);

        let order_by = meta
            .get("orderBy")
            .and_then(AttrValue::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from);
        let start = meta
            .get("start")
            .and_then(AttrValue::as_json)
            .filter(|v| !v.is_null())
            .cloned();
        let given_limit = params.keys().any(|k| keys_match(k, "limit"));
        let limit = meta
            .get("limit")
            .filter(|_| given_limit)
            .and_then(parse_limit)
            .filter(|n| *n > 0)
            .unwrap_or(default_limit);

        let rest = params
            .iter()
            .filter(|(key, _)| {
                key.as_str() != "entity"
                    && key.as_str() != "id"
                    && !schema.field_names().any(|f| keys_match(key, f))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        (
            SearchMeta {
                order_by,
                start,
                limit,
            },
            rest,
        )
    }

    /// A query carrying this ordering and paging, without filters.
    pub fn to_query(&self) -> Query {
        Query {
            order_by: self.order_by.clone(),
            start_at: self.start.clone(),
            limit: Some(self.limit),
            ..Query::default()
        }
    }
}

fn parse_limit(value: &AttrValue) -> Option<usize> {
    match value.as_json()? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
