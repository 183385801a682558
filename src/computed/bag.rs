//! Free functions over plain keyed bags.
//!
//! Fuzzy key matching strips exactly three separator characters (space,
//! underscore, hyphen) and case-folds what remains. CamelCase boundaries are
//! not split: `firstName`, `first_name` and `FIRST NAME` all match, while
//! `first.name` does not.

use super::value::{AttrValue, Properties};

const SEPARATORS: [char; 3] = [' ', '_', '-'];

/// Remove every separator character, leaving case untouched.
pub fn strip_separators(key: &str) -> String {
    key.chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

/// The fuzzy comparison form of a key.
pub fn normalize_key(key: &str) -> String {
    strip_separators(key).to_lowercase()
}

pub fn keys_match(left: &str, right: &str) -> bool {
    normalize_key(left) == normalize_key(right)
}

/// Assign every source value whose key fuzzily matches one of the target's
/// own keys. Source keys are visited in bag order, so the last match wins.
pub fn hydrate(target: &mut Properties, source: &Properties) {
    for (prop, slot) in target.iter_mut() {
        let wanted = normalize_key(prop);
        for (key, value) in source {
            if normalize_key(key) == wanted {
                *slot = value.clone();
            }
        }
    }
}

/// Copy the bag with separator-stripped keys, skipping `exclude_keys`
/// (matched against the original key) and, when `exclude_empty` is set,
/// undefined values.
pub fn extract(obj: &Properties, exclude_empty: bool, exclude_keys: &[&str]) -> Properties {
    obj.iter()
        .filter(|(prop, _)| !exclude_keys.contains(&prop.as_str()))
        .filter(|(_, value)| !(exclude_empty && value.is_undefined()))
        .map(|(prop, value)| (strip_separators(prop), value.clone()))
        .collect()
}

/// Entries of `base` whose key is absent from `minus`. Values are ignored.
pub fn diff(base: &Properties, minus: &Properties) -> Properties {
    base.iter()
        .filter(|(k, _)| !minus.contains_key(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Drop undefined values and the literal string `"undefined"`.
pub fn filter_undefined_computed(obj: &Properties) -> Properties {
    obj.iter()
        .filter(|(_, v)| !v.is_undefined_like())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Drop undefined and `null` values. The string `"undefined"` is kept.
pub fn filter_empty_computed(obj: &Properties) -> Properties {
    obj.iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Replace every undefined or `null` value with `value`.
pub fn set_to_all_empty_fields(obj: &Properties, value: AttrValue) -> Properties {
    obj.iter()
        .map(|(k, v)| {
            let v = if v.is_empty() { value.clone() } else { v.clone() };
            (k.clone(), v)
        })
        .collect()
}
