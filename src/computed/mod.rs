//! Attribute mapping between external, loosely keyed data and an entity's
//! declared fields.
//!
//! A [`Computed`] holds one value per field of its [`EntitySchema`], an
//! optional custom [`AliasScheme`] and an optional validator. It is only
//! ever changed through [`Computed::input`] and [`Computed::set_props`];
//! fields missing from the input keep their previous value.

mod bag;
mod schema;
mod value;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

pub use bag::{
    diff, extract, filter_empty_computed, filter_undefined_computed, hydrate, keys_match,
    normalize_key, set_to_all_empty_fields, strip_separators,
};
pub use schema::{AliasScheme, EntitySchema, EntitySchemaBuilder, FieldDescriptor};
pub use value::{AttrValue, Properties, UNDEFINED_TEXT, properties_from_json, properties_to_json};

use crate::error::RestError;

/// Predicate run by [`Computed::validate`].
pub type Validator = Arc<dyn Fn(&Computed) -> bool + Send + Sync>;

/// A value holder for one entity type.
///
/// Cloning yields an independent snapshot; the schema and validator are
/// shared, the values are not.
#[derive(Clone)]
pub struct Computed {
    schema: Arc<EntitySchema>,
    values: Vec<AttrValue>,
    alias_scheme: Option<AliasScheme>,
    validator: Option<Validator>,
}

impl Debug for Computed {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Computed")
            .field("type_name", &self.schema.type_name())
            .field("values", &self.fields_bag())
            .field("alias_scheme", &self.alias_scheme)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl Computed {
    /// A fresh instance with every field at its declared default.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| f.default_value().clone())
            .collect();
        Self {
            schema,
            values,
            alias_scheme: None,
            validator: None,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// The active scheme: the custom one when set and non-empty, otherwise
    /// the identity scheme over the declared fields.
    pub fn alias_scheme(&self) -> &AliasScheme {
        match &self.alias_scheme {
            Some(custom) if !custom.is_empty() => custom,
            _ => self.schema.default_scheme(),
        }
    }

    /// Install a custom scheme. Every entry must target a declared field.
    pub fn set_alias_scheme(&mut self, scheme: AliasScheme) -> Result<(), RestError> {
        if let Some((external, field)) = scheme.iter().find(|(_, f)| !self.schema.contains(f)) {
            return Err(RestError::UnknownAliasTarget {
                external: external.clone(),
                field: field.clone(),
            });
        }
        self.alias_scheme = Some(scheme);
        Ok(())
    }

    pub fn set_validator(&mut self, validator: Validator) {
        self.validator = Some(validator);
    }

    /// `true` without a validator, otherwise the validator's verdict.
    pub fn validate(&self) -> bool {
        self.validator.as_ref().is_none_or(|v| v(self))
    }

    /// Current value of a declared field; `None` for undeclared names.
    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.schema.position(field).map(|i| &self.values[i])
    }

    /// Stage alias-mapped values, then fuzzily hydrate from `data` with the
    /// staged values taking precedence.
    pub fn input(&mut self, data: &Properties) -> &mut Self {
        let staged: Vec<(usize, AttrValue)> = self
            .alias_scheme()
            .iter()
            .filter_map(|(external, field)| {
                let value = data.get(external).filter(|v| !v.is_undefined())?;
                Some((self.schema.position(field)?, value.clone()))
            })
            .collect();

        self.set_props(data);
        for (index, value) in staged {
            self.values[index] = value;
        }
        self
    }

    /// Fuzzy hydration: any key of `data` matching a declared field under
    /// separator-stripping and case-folding is assigned to that field.
    pub fn set_props(&mut self, data: &Properties) -> &mut Self {
        let mut own = self.fields_bag();
        hydrate(&mut own, data);
        for (index, field) in self.schema.fields().iter().enumerate() {
            if let Some(value) = own.remove(field.name()) {
                self.values[index] = value;
            }
        }
        self
    }

    /// Project onto external keys: identity entries overridden by the custom
    /// scheme, with undefined values dropped.
    pub fn output(&self) -> Properties {
        let map = match &self.alias_scheme {
            Some(custom) => self.schema.default_scheme().overridden_by(custom),
            None => self.schema.default_scheme().clone(),
        };
        let projected: Properties = map
            .iter()
            .map(|(external, field)| {
                let value = self.get(field).cloned().unwrap_or_default();
                (external.clone(), value)
            })
            .collect();
        filter_undefined_computed(&projected)
    }

    /// Snapshot of all declared fields, keyed by separator-stripped name.
    pub fn to_object(&self, exclude_empty: bool) -> Properties {
        filter_undefined_computed(&extract(&self.fields_bag(), exclude_empty, &[]))
    }

    fn fields_bag(&self) -> Properties {
        self.schema
            .field_names()
            .zip(self.values.iter())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

/// Construct an instance, then install `alias_scheme`, then `validator`,
/// then feed `data` through [`Computed::input`].
pub fn build_computed(
    schema: &Arc<EntitySchema>,
    data: Option<&Properties>,
    validator: Option<Validator>,
    alias_scheme: Option<AliasScheme>,
) -> Result<Computed, RestError> {
    let mut computed = Computed::new(Arc::clone(schema));
    if let Some(scheme) = alias_scheme {
        computed.set_alias_scheme(scheme)?;
    }
    if let Some(validator) = validator {
        computed.set_validator(validator);
    }
    if let Some(data) = data {
        computed.input(data);
    }
    Ok(computed)
}
