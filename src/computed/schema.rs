//! Static field registries and alias schemes.

use std::collections::BTreeMap;
use std::collections::btree_map::Iter;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RestError;
use crate::types::EntityPath;

use super::bag::normalize_key;
use super::value::AttrValue;

/// A declared scalar field and the value a fresh instance starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    default: AttrValue,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }

    /// A field whose default is undefined.
    pub fn undefined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: AttrValue::Undefined,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &AttrValue {
        &self.default
    }
}

/// Maps external keys to the declared field they carry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasScheme(BTreeMap<String, String>);

impl AliasScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field exposed under its own name.
    pub fn identity<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        fields
            .into_iter()
            .map(|f| (f.to_string(), f.to_string()))
            .collect()
    }

    /// Builder-style insert of `external -> field`.
    pub fn with(mut self, external: impl Into<String>, field: impl Into<String>) -> Self {
        self.insert(external, field);
        self
    }

    pub fn insert(&mut self, external: impl Into<String>, field: impl Into<String>) {
        self.0.insert(external.into(), field.into());
    }

    /// The field carried by an external key.
    pub fn field_for(&self, external: &str) -> Option<&str> {
        self.0.get(external).map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self` with every entry of `overrides` applied on top.
    pub fn overridden_by(&self, overrides: &AliasScheme) -> AliasScheme {
        let mut merged = self.clone();
        for (external, field) in overrides.iter() {
            merged.insert(external.clone(), field.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasScheme {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AliasScheme(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The declared field set of one entity type.
///
/// Built once per type and shared behind an `Arc`; membership never changes
/// after [`EntitySchemaBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    type_name: String,
    fields: Vec<FieldDescriptor>,
    default_scheme: AliasScheme,
}

impl EntitySchema {
    pub fn builder(type_name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// PascalCase type name, e.g. `UserProfile`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::name)
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Identity scheme over the declared fields.
    pub fn default_scheme(&self) -> &AliasScheme {
        &self.default_scheme
    }

    pub fn path(&self) -> EntityPath {
        EntityPath::from_type_name(&self.type_name)
    }
}

pub struct EntitySchemaBuilder {
    type_name: String,
    fields: Vec<FieldDescriptor>,
}

impl EntitySchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        self.fields.push(FieldDescriptor::new(name, default));
        self
    }

    pub fn undefined_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor::undefined(name));
        self
    }

    pub fn build(self) -> Result<Arc<EntitySchema>, RestError> {
        if self.type_name.is_empty() {
            return Err(RestError::EmptyTypeName);
        }

        let mut seen: BTreeMap<String, &str> = BTreeMap::new();
        for field in &self.fields {
            if let Some(first) = seen.insert(normalize_key(&field.name), &field.name) {
                return Err(if first == field.name {
                    RestError::DuplicateField {
                        entity: self.type_name.clone(),
                        field: field.name.clone(),
                    }
                } else {
                    RestError::AmbiguousField {
                        entity: self.type_name.clone(),
                        first: first.to_string(),
                        second: field.name.clone(),
                    }
                });
            }
        }

        let default_scheme = AliasScheme::identity(self.fields.iter().map(FieldDescriptor::name));
        Ok(Arc::new(EntitySchema {
            type_name: self.type_name,
            fields: self.fields,
            default_scheme,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_profile() -> Arc<EntitySchema> {
        EntitySchema::builder("UserProfile")
            .undefined_field("firstName")
            .field("age", 18)
            .build()
            .unwrap()
    }

    #[test]
    fn test_schema_fields_and_defaults() {
        let schema = user_profile();
        assert_eq!(schema.type_name(), "UserProfile");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), ["firstName", "age"]);
        assert_eq!(schema.position("age"), Some(1));
        assert!(!schema.contains("lastName"));
        assert_eq!(schema.fields()[1].default_value().as_i64(), Some(18));
        assert!(schema.fields()[0].default_value().is_undefined());
    }

    #[test]
    fn test_default_scheme_is_identity() {
        let schema = user_profile();
        assert_eq!(schema.default_scheme().len(), 2);
        assert_eq!(schema.default_scheme().field_for("firstName"), Some("firstName"));
        assert_eq!(schema.default_scheme().field_for("age"), Some("age"));
    }

    #[test]
    fn test_schema_path() {
        assert_eq!(user_profile().path().as_str(), "user-profile");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = EntitySchema::builder("Thing")
            .undefined_field("name")
            .undefined_field("name")
            .build()
            .unwrap_err();
        assert!(matches!(err, RestError::DuplicateField { .. }));
    }

    #[test]
    fn test_ambiguous_field_rejected() {
        let err = EntitySchema::builder("Thing")
            .undefined_field("a_b")
            .undefined_field("ab")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RestError::AmbiguousField {
                entity: "Thing".into(),
                first: "a_b".into(),
                second: "ab".into(),
            }
        );
    }

    #[test]
    fn test_empty_type_name_rejected() {
        assert_eq!(
            EntitySchema::builder("").build().unwrap_err(),
            RestError::EmptyTypeName
        );
    }

    #[test]
    fn test_alias_scheme_override() {
        let base = AliasScheme::identity(["a", "b"]);
        let custom = AliasScheme::new().with("A", "a").with("b", "a");
        let merged = base.overridden_by(&custom);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.field_for("A"), Some("a"));
        assert_eq!(merged.field_for("b"), Some("a"));
        assert_eq!(merged.field_for("a"), Some("a"));
    }

    #[test]
    fn test_alias_scheme_serde_is_a_plain_map() {
        let scheme = AliasScheme::new().with("first_name", "firstName");
        let value = serde_json::to_value(&scheme).unwrap();
        assert_eq!(value, serde_json::json!({"first_name": "firstName"}));
        let back: AliasScheme = serde_json::from_value(value).unwrap();
        assert_eq!(back, scheme);
    }
}
