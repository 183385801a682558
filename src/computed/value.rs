//! Attribute values and plain keyed bags.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The literal text treated as an undefined value when filtering bags.
pub const UNDEFINED_TEXT: &str = "undefined";

/// A single attribute slot.
///
/// `Undefined` is distinct from JSON `null`: a declared field nobody has set
/// yet is undefined, while `null` is a value a client sent on purpose.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Undefined,
    Json(Value),
    /// Store sentinel asking an update to remove the field.
    Unset,
}

impl AttrValue {
    pub fn null() -> Self {
        AttrValue::Json(Value::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, AttrValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Json(Value::Null))
    }

    /// Undefined or `null`.
    pub fn is_empty(&self) -> bool {
        self.is_undefined() || self.is_null()
    }

    /// Undefined, or the literal string `"undefined"`.
    pub fn is_undefined_like(&self) -> bool {
        match self {
            AttrValue::Undefined => true,
            AttrValue::Json(Value::String(s)) => s == UNDEFINED_TEXT,
            _ => false,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            AttrValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }
}

impl From<Value> for AttrValue {
    fn from(v: Value) -> Self {
        AttrValue::Json(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Json(Value::String(s.to_string()))
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Json(Value::String(s))
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Json(Value::from(n))
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Json(Value::from(n))
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        AttrValue::Json(Value::from(n))
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Json(Value::from(n))
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Json(Value::Bool(b))
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Json(v) => v.serialize(serializer),
            AttrValue::Undefined | AttrValue::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(AttrValue::Json)
    }
}

/// A plain keyed bag of attribute values.
pub type Properties = BTreeMap<String, AttrValue>;

/// Build a bag from a JSON object. Anything but an object yields an empty bag.
pub fn properties_from_json(value: Value) -> Properties {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, AttrValue::Json(v)))
            .collect(),
        _ => Properties::new(),
    }
}

/// Render a bag as a JSON object, omitting undefined and unset entries.
pub fn properties_to_json(props: &Properties) -> Value {
    let map: Map<String, Value> = props
        .iter()
        .filter_map(|(k, v)| v.as_json().map(|v| (k.clone(), v.clone())))
        .collect();
    Value::Object(map)
}
