//! Sparse configuration trees.
//!
//! Every source layer is reduced to a `serde_json::Value` object holding
//! only the keys that layer mentions. Layers are merged key-by-key in
//! precedence order and the result is decoded once into a
//! `GlobalConfiguration`, whose serde defaults fill everything no layer
//! mentioned. A `null` in an overlay removes the key from the layers
//! below it (used to disable a provider).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::error::ConfigError;
use crate::config::fields::{self, FieldDescriptor, FieldKind, CERTIFICATES, CERTIFICATE_KEYS};
use crate::config::schema::GlobalConfiguration;

/// An empty layer.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

/// Merge `overlay` into `base`. Objects merge recursively, `null` removes,
/// anything else (including arrays) replaces.
pub fn merge(base: &mut Value, overlay: Value) {
    match overlay {
        Value::Object(entries) => {
            if !base.is_object() {
                *base = empty();
            }
            if let Value::Object(target) = base {
                for (key, value) in entries {
                    if value.is_null() {
                        target.remove(&key);
                    } else {
                        merge(target.entry(key).or_insert(Value::Null), value);
                    }
                }
            }
        }
        other => *base = other,
    }
}

/// Store an already-validated value for `field` in `tree`.
///
/// Provider switches create an empty namespace when `true` (so the
/// provider is present with its defaults) and a removal marker when
/// `false`.
pub fn assign(tree: &mut Value, field: &FieldDescriptor, value: Value) {
    let value = match (field.kind, value) {
        (FieldKind::Switch, Value::Bool(true)) => empty(),
        (FieldKind::Switch, _) => Value::Null,
        (_, value) => value,
    };

    let mut node = tree;
    let mut segments = field.segments().peekable();
    while let Some(segment) = segments.next() {
        if !node.is_object() {
            *node = empty();
        }
        let Value::Object(map) = node else {
            unreachable!("node was just made an object");
        };
        let slot = map.entry(segment).or_insert(Value::Null);
        if segments.peek().is_none() {
            // Enabling a namespace that already has fields keeps them.
            merge(slot, value);
            return;
        }
        node = slot;
    }
}

/// Rewrite keys to their canonical spelling so that file keys match
/// case-insensitively. Unknown keys are kept as they are and reported when
/// the tree is decoded.
///
/// Two spellings of the same key in one table (`port` and `PORT`) are
/// rejected rather than one silently replacing the other.
pub fn canonicalize(tree: Value) -> Result<Value, String> {
    canonicalize_level(tree, None)
}

fn canonicalize_level(value: Value, namespace: Option<&str>) -> Result<Value, String> {
    let Value::Object(entries) = value else {
        return Ok(value);
    };

    let mut canonical = Map::new();
    let mut spellings: BTreeMap<String, String> = BTreeMap::new();
    for (original, value) in entries {
        let key = fields::canonical_key(namespace, &original)
            .map(str::to_string)
            .unwrap_or_else(|| original.clone());
        if let Some(previous) = spellings.insert(key.clone(), original.clone()) {
            return Err(duplicate_key(namespace, &previous, &original));
        }
        let value = match namespace {
            None if key == CERTIFICATES => canonicalize_certificates(value)?,
            None => canonicalize_level(value, Some(key.as_str()))?,
            Some(_) => value,
        };
        canonical.insert(key, value);
    }
    Ok(Value::Object(canonical))
}

fn canonicalize_certificates(value: Value) -> Result<Value, String> {
    let Value::Array(entries) = value else {
        return Ok(value);
    };
    let mut canonical = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(map) = entry else {
            canonical.push(entry);
            continue;
        };
        let mut pair = Map::new();
        let mut spellings: BTreeMap<String, String> = BTreeMap::new();
        for (original, value) in map {
            let key = CERTIFICATE_KEYS
                .iter()
                .find(|k| k.eq_ignore_ascii_case(&original))
                .map(|k| k.to_string())
                .unwrap_or_else(|| original.clone());
            if let Some(previous) = spellings.insert(key.clone(), original.clone()) {
                return Err(duplicate_key(Some(CERTIFICATES), &previous, &original));
            }
            pair.insert(key, value);
        }
        canonical.push(Value::Object(pair));
    }
    Ok(Value::Array(canonical))
}

fn duplicate_key(namespace: Option<&str>, first: &str, second: &str) -> String {
    let scope = namespace.map(|ns| format!(" in '{}'", ns)).unwrap_or_default();
    format!(
        "duplicate key{}: '{}' and '{}' name the same setting",
        scope, first, second
    )
}

/// Decode a merged tree. `origin` names the source in errors and warnings
/// (a file path, "environment", "command line").
pub fn decode(tree: Value, origin: &str) -> Result<GlobalConfiguration, ConfigError> {
    let mut ignored = Vec::new();
    let config = serde_ignored::deserialize(tree, |path| ignored.push(path.to_string()))
        .map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    for key in ignored {
        tracing::warn!(origin, key = %key, "Ignoring unknown configuration key");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(path: &str) -> &'static FieldDescriptor {
        fields::FIELDS.iter().find(|f| f.path == path).unwrap()
    }

    #[test]
    fn test_merge_overrides_only_mentioned_keys() {
        let mut base = json!({ "port": ":8080", "logLevel": "INFO", "docker": { "endpoint": "a" } });
        merge(&mut base, json!({ "port": ":9090", "docker": { "watch": false } }));
        assert_eq!(
            base,
            json!({
                "port": ":9090",
                "logLevel": "INFO",
                "docker": { "endpoint": "a", "watch": false }
            })
        );
    }

    #[test]
    fn test_merge_null_removes() {
        let mut base = json!({ "docker": { "endpoint": "a" }, "port": ":80" });
        merge(&mut base, json!({ "docker": null }));
        assert_eq!(base, json!({ "port": ":80" }));
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let mut base = json!({ "certificates": [{ "certFile": "a", "keyFile": "b" }] });
        merge(&mut base, json!({ "certificates": [] }));
        assert_eq!(base, json!({ "certificates": [] }));
    }

    #[test]
    fn test_assign_nested_field() {
        let mut tree = empty();
        assign(&mut tree, field("docker.endpoint"), json!("tcp://x"));
        assign(&mut tree, field("port"), json!(":1"));
        assert_eq!(tree, json!({ "docker": { "endpoint": "tcp://x" }, "port": ":1" }));
    }

    #[test]
    fn test_assign_switch() {
        let mut tree = empty();
        assign(&mut tree, field("docker.endpoint"), json!("tcp://x"));
        assign(&mut tree, field("docker"), json!(true));
        assign(&mut tree, field("web"), json!(true));
        assign(&mut tree, field("consul"), json!(false));
        assert_eq!(
            tree,
            json!({ "docker": { "endpoint": "tcp://x" }, "web": {}, "consul": null })
        );
    }

    #[test]
    fn test_assign_replaces_scalar_namespace() {
        let mut tree = json!({ "docker": "oops" });
        assign(&mut tree, field("docker.watch"), json!(false));
        assert_eq!(tree, json!({ "docker": { "watch": false } }));
    }

    #[test]
    fn test_canonicalize_keys() {
        let tree = canonicalize(json!({
            "PORT": ":1",
            "GraceTimeout": 5,
            "Docker": { "ENDPOINT": "x", "Mystery": 1 },
            "certificates": [{ "CERTFILE": "a", "keyfile": "b" }],
            "unknown": { "Nested": true }
        }))
        .unwrap();
        assert_eq!(
            tree,
            json!({
                "port": ":1",
                "graceTimeOut": 5,
                "docker": { "endpoint": "x", "Mystery": 1 },
                "certificates": [{ "certFile": "a", "keyFile": "b" }],
                "unknown": { "Nested": true }
            })
        );
    }

    #[test]
    fn test_canonicalize_rejects_case_duplicates() {
        let err = canonicalize(json!({ "port": ":2", "PORT": ":1" })).unwrap_err();
        assert!(err.contains("'PORT'") && err.contains("'port'"), "{}", err);

        let err = canonicalize(json!({ "docker": { "endpoint": "a", "Endpoint": "b" } }))
            .unwrap_err();
        assert!(err.contains("in 'docker'"), "{}", err);

        let err = canonicalize(json!({
            "certificates": [{ "certFile": "a", "CERTFILE": "b", "keyFile": "k" }]
        }))
        .unwrap_err();
        assert!(err.contains("in 'certificates'"), "{}", err);
    }

    #[test]
    fn test_canonicalize_keeps_distinct_unknown_keys() {
        let tree = canonicalize(json!({ "extra": 1, "Extra": 2 })).unwrap();
        assert_eq!(tree, json!({ "extra": 1, "Extra": 2 }));
    }

    #[test]
    fn test_decode_fills_defaults() {
        let config = decode(json!({ "port": ":8080", "web": {} }), "test").unwrap();
        assert_eq!(config.port, ":8080");
        assert_eq!(config.grace_time_out, GlobalConfiguration::default().grace_time_out);
        assert_eq!(config.web.unwrap().address, ":8080");
        assert!(config.docker.is_none());
    }

    #[test]
    fn test_decode_type_mismatch_names_origin() {
        let err = decode(json!({ "port": 80 }), "/etc/switchyard/switchyard.toml").unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => {
                assert_eq!(origin, "/etc/switchyard/switchyard.toml")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let config = decode(json!({ "bogus": 1, "docker": { "bogus": 2 } }), "test").unwrap();
        assert!(config.docker.is_some());
    }
}
