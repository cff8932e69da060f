// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Configuration trees handed to the template renderer.
//!
//! A tree is a plain `serde_json::Value`. Objects keep their keys sorted, so
//! two equal trees always serialize to the same bytes.

use serde_json::{Map, Value};

/// An empty configuration tree.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Deep-merge `overlay` into `base`.
///
/// Objects are merged key by key; for every other value (lists included) the
/// overlay replaces the base wholesale.
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Whether a tree is an empty object (or null).
#[cfg(test)]
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_scalars_and_keeps_disjoint_keys() {
        let base = json!({"controller": {"replicas": 1, "image": "nginx"}, "rbac": true});
        let overlay = json!({"controller": {"replicas": 3}, "defaultBackend": {"enabled": true}});

        let merged = merge(base, overlay);

        assert_eq!(
            merged,
            json!({
                "controller": {"replicas": 3, "image": "nginx"},
                "rbac": true,
                "defaultBackend": {"enabled": true}
            })
        );
    }

    #[test]
    fn test_merge_replaces_lists() {
        let base = json!({"ranges": ["10.0.0.0/8", "192.168.0.0/16"]});
        let overlay = json!({"ranges": ["1.2.3.4/32"]});

        assert_eq!(merge(base, overlay), json!({"ranges": ["1.2.3.4/32"]}));
    }

    #[test]
    fn test_merge_map_over_scalar_replaces() {
        let base = json!({"service": "LoadBalancer"});
        let overlay = json!({"service": {"type": "NodePort"}});

        assert_eq!(merge(base, overlay), json!({"service": {"type": "NodePort"}}));
    }

    #[test]
    fn test_merge_with_empty_overlay_is_identity() {
        let base = json!({"a": {"b": [1, 2]}});
        assert_eq!(merge(base.clone(), empty()), base);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&empty()));
        assert!(is_empty(&Value::Null));
        assert!(!is_empty(&json!({"enabled": false})));
        assert!(!is_empty(&json!([])));
    }
}
