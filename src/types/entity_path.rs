//! Canonical route segments for entity kinds.
//!
//! A type name `UserProfile` routes as `user-profile` and is stored in the
//! `userProfile` collection.

use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").unwrap());
static HYPHEN_LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("-([a-z])").unwrap());

/// PascalCase type name to kebab-case path.
///
/// The first character is lower-cased, then every remaining ASCII uppercase
/// letter becomes a hyphen followed by its lowercase form.
pub fn class_to_path(type_name: &str) -> String {
    let mut chars = type_name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let head: String = first.to_lowercase().chain(chars).collect();
    UPPERCASE
        .replace_all(&head, |caps: &Captures| format!("-{}", caps[0].to_lowercase()))
        .into_owned()
}

/// Kebab-case path to camelCase collection name.
pub fn path_to_collection(path: &str) -> String {
    HYPHEN_LOWERCASE
        .replace_all(path, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// An entity path, always lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPath(String);

impl EntityPath {
    pub fn from_type_name(type_name: &str) -> Self {
        EntityPath(class_to_path(type_name))
    }

    /// Resolve a raw route segment (lower-cased).
    pub fn from_segment(segment: &str) -> Self {
        EntityPath(segment.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_collection(&self) -> String {
        path_to_collection(&self.0)
    }
}

impl Display for EntityPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        two_words = { "UserProfile", "user-profile" },
        single = { "User", "user" },
        three_words = { "SearchMetaData", "search-meta-data" },
        acronym = { "HTTPLog", "h-t-t-p-log" },
        already_lower = { "profile", "profile" },
        digits = { "Order2Item", "order2-item" },
        empty = { "", "" },
    )]
    fn test_class_to_path(type_name: &str, expected: &str) {
        assert_eq!(class_to_path(type_name), expected);
    }

    #[parameterized(
        two_words = { "user-profile", "userProfile" },
        single = { "user", "user" },
        three_words = { "search-meta-data", "searchMetaData" },
        digit_after_hyphen = { "order-2", "order-2" },
    )]
    fn test_path_to_collection(path: &str, expected: &str) {
        assert_eq!(path_to_collection(path), expected);
    }

    #[parameterized(
        user_profile = { "UserProfile" },
        search_meta = { "SearchMeta" },
        order_item = { "OrderLineItem" },
    )]
    fn test_round_trip(type_name: &str) {
        let collection = path_to_collection(&class_to_path(type_name));
        let mut expected = type_name.to_string();
        expected[..1].make_ascii_lowercase();
        assert_eq!(collection, expected);
    }

    #[test]
    fn test_entity_path() {
        let path = EntityPath::from_type_name("UserProfile");
        assert_eq!(path.as_str(), "user-profile");
        assert_eq!(path.to_collection(), "userProfile");
        assert_eq!(path, EntityPath::from_segment("User-Profile"));
        assert_eq!(path.to_string(), "user-profile");
    }
}
