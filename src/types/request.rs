//! Transport-neutral request handed to the dispatcher.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::computed::{AttrValue, Properties, filter_undefined_computed};

use super::method::Method;

/// What a host router extracts from its own request type: the method, the
/// `:entity` and optional `:id` route segments, the query string and the
/// decoded body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RestRequest {
    pub method: String,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub query: Properties,
    #[serde(default)]
    pub body: Properties,
}

impl RestRequest {
    pub fn new(method: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Properties) -> Self {
        self.body = body;
        self
    }

    /// The parsed method; `None` for methods without a routing bucket.
    pub fn method_kind(&self) -> Option<Method> {
        Method::from_str(&self.method)
            .ok()
            .filter(|m| !m.is_wildcard())
    }

    /// Every parameter in one bag: route segments, then body, then query,
    /// later sources winning. Undefined entries are dropped.
    pub fn params(&self) -> Properties {
        let mut all = Properties::new();
        all.insert("entity".into(), AttrValue::from(self.entity.as_str()));
        all.insert(
            "id".into(),
            self.id.as_deref().map(AttrValue::from).unwrap_or_default(),
        );
        all.extend(self.body.iter().map(|(k, v)| (k.clone(), v.clone())));
        all.extend(self.query.iter().map(|(k, v)| (k.clone(), v.clone())));
        filter_undefined_computed(&all)
    }
}
