//! Flat configuration maps and the shallow-merge rule.
//!
//! Component configs are projected to flat `String -> Value` maps before
//! merging. Overrides are always partial maps: a key present in the override
//! replaces the base value, a key absent falls through, and no override can
//! delete a base key.

use serde_json::{Map, Value};

/// Flat configuration payload, as rendered consumers see it.
pub type ConfigMap = Map<String, Value>;

/// Merge `overrides` onto `base`, override keys winning.
///
/// `None` is equivalent to an empty override map. Keys never disappear:
/// the result always contains every key of `base`.
pub fn shallow_merge(base: &ConfigMap, overrides: Option<&ConfigMap>) -> ConfigMap {
    let mut merged = base.clone();
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
