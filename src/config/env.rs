//! Environment variable overlay.
//!
//! A variable named `<PREFIX><PATH>` (path upper-cased, dots replaced by
//! underscores) overrides the field at that path, e.g.
//! `SWITCHYARD_DOCKER_ENDPOINT` sets `docker.endpoint`. Only variables that
//! are present contribute; prefixed variables naming no field are ignored.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::config::error::ConfigError;
use crate::config::fields;
use crate::config::layer;
use crate::config::ENV_PREFIX;

/// Snapshot of the environment variables under a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    prefix: String,
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the process environment under the standard prefix.
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
        Self::from_pairs(ENV_PREFIX, vars)
    }

    /// Build a snapshot from explicit pairs; only names starting with
    /// `prefix` are kept.
    pub fn from_pairs<I, K, V>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .filter(|(name, _): &(String, String)| name.starts_with(prefix))
            .collect();
        Self {
            prefix: prefix.to_string(),
            vars,
        }
    }

    /// No variables at all.
    pub fn empty() -> Self {
        Self::from_pairs(ENV_PREFIX, std::iter::empty::<(String, String)>())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Sparse tree of the fields set by the environment.
    pub fn overlay(&self) -> Result<Value, ConfigError> {
        let mut tree = layer::empty();
        let mut matched = Vec::new();

        for field in fields::overlay_order() {
            let name = field.env_var(&self.prefix);
            let Some(raw) = self.vars.get(&name) else {
                continue;
            };
            let value = field.kind.parse(raw).map_err(|message| ConfigError::Parse {
                origin: format!("environment variable {}", name),
                message,
            })?;
            layer::assign(&mut tree, field, value);
            matched.push(name);
        }

        for name in self.vars.keys().filter(|name| !matched.contains(name)) {
            debug!(variable = %name, "Ignoring environment variable that names no configuration field");
        }
        if !matched.is_empty() {
            debug!(variables = ?matched, "Applied environment overrides");
        }
        Ok(tree)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        Environment::from_pairs("SWITCHYARD_", pairs.iter().copied())
    }

    #[test]
    fn test_only_prefixed_variables_are_kept() {
        let env = env(&[("SWITCHYARD_PORT", ":1"), ("PATH", "/bin")]);
        assert_eq!(env.get("SWITCHYARD_PORT"), Some(":1"));
        assert_eq!(env.get("PATH"), None);
    }

    #[test]
    fn test_overlay_maps_paths() {
        let overlay = env(&[
            ("SWITCHYARD_PORT", ":9090"),
            ("SWITCHYARD_GRACETIMEOUT", "30"),
            ("SWITCHYARD_DOCKER_ENDPOINT", "tcp://127.0.0.1:2375"),
            ("SWITCHYARD_MARATHON_NETWORKINTERFACE", "eth1"),
            ("SWITCHYARD_LOGLEVEL", "info"),
        ])
        .overlay()
        .unwrap();

        assert_eq!(
            overlay,
            json!({
                "port": ":9090",
                "graceTimeOut": "30",
                "logLevel": "INFO",
                "docker": { "endpoint": "tcp://127.0.0.1:2375" },
                "marathon": { "networkInterface": "eth1" }
            })
        );
    }

    #[test]
    fn test_unset_fields_are_not_touched() {
        let overlay = env(&[]).overlay().unwrap();
        assert_eq!(overlay, json!({}));
    }

    #[test]
    fn test_unknown_prefixed_variables_are_ignored() {
        let overlay = env(&[("SWITCHYARD_NOT_A_FIELD", "1")]).overlay().unwrap();
        assert_eq!(overlay, json!({}));
    }

    #[test]
    fn test_provider_switch() {
        let overlay = env(&[("SWITCHYARD_WEB", "true"), ("SWITCHYARD_DOCKER", "false")])
            .overlay()
            .unwrap();
        assert_eq!(overlay, json!({ "web": {}, "docker": null }));
    }

    #[test]
    fn test_certificate_list() {
        let overlay = env(&[("SWITCHYARD_CERTIFICATES", "a.crt,a.key")]).overlay().unwrap();
        assert_eq!(
            overlay,
            json!({ "certificates": [{ "certFile": "a.crt", "keyFile": "a.key" }] })
        );
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = env(&[("SWITCHYARD_PROVIDERSTHROTTLEDURATION", "often")])
            .overlay()
            .unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => {
                assert_eq!(origin, "environment variable SWITCHYARD_PROVIDERSTHROTTLEDURATION")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
