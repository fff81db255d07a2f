//! Resolution of the final configuration.
//!
//! Precedence, lowest to highest:
//! 1. defaults (`GlobalConfiguration::default()`)
//! 2. configuration file
//! 3. environment variables
//! 4. flags present on the command line
//!
//! The file and environment layers are decoded together first so that
//! type errors point at the file. The command-line overlay is then merged
//! onto that decoded base and the result decoded into the immutable
//! configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::args::parse_arguments;
use crate::config::error::ConfigError;
use crate::config::layer;
use crate::config::loader::{ConfigLoader, FileLayer};
use crate::config::schema::GlobalConfiguration;

#[derive(Debug, Clone)]
pub struct Resolver {
    loader: ConfigLoader,
    config_file: Option<PathBuf>,
}

impl Resolver {
    /// Standard search locations and the process environment.
    pub fn new() -> Self {
        Self::with_loader(ConfigLoader::standard())
    }

    pub fn with_loader(loader: ConfigLoader) -> Self {
        Self {
            loader,
            config_file: None,
        }
    }

    /// Explicit file (or directory) to load. `-c/--configFile` on the
    /// command line takes precedence over this.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Resolve the configuration for `argv` (program name first).
    ///
    /// A missing configuration file is only an error when one was given
    /// explicitly; otherwise resolution continues from the defaults.
    pub fn resolve<I, T>(&self, argv: I) -> Result<GlobalConfiguration, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let arguments = parse_arguments(argv)?;
        let explicit: Option<&Path> = arguments.config_file().or(self.config_file.as_deref());

        let (mut tree, origin) = match self.loader.read_file_layer(explicit) {
            Ok(FileLayer { path, tree }) => (tree, path.display().to_string()),
            Err(ConfigError::NotFound { searched }) if explicit.is_none() => {
                info!(
                    candidates = searched.len(),
                    directories = ?self.loader.search_paths().directories(),
                    "No configuration file found, using defaults"
                );
                (layer::empty(), "environment".to_string())
            }
            Err(e) => return Err(e),
        };

        layer::merge(&mut tree, self.loader.environment().overlay()?);
        let base = layer::decode(tree, &origin)?;
        if arguments.is_empty() {
            return Ok(base);
        }

        let mut tree = serde_json::to_value(&base).map_err(|e| ConfigError::Parse {
            origin,
            message: e.to_string(),
        })?;
        layer::merge(&mut tree, arguments.into_explicit());
        layer::decode(tree, "command line")
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::Environment;
    use crate::config::loader::SearchPaths;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(dir: &Path, env: &[(&str, &str)]) -> Resolver {
        Resolver::with_loader(ConfigLoader::new(
            SearchPaths::new("switchyard", vec![dir.to_path_buf()]),
            Environment::from_pairs("SWITCHYARD_", env.iter().copied()),
        ))
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = resolver(tmp.path(), &[]).resolve(["switchyard"]).unwrap();
        assert_eq!(config, GlobalConfiguration::default());
    }

    #[test]
    fn test_missing_explicit_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = resolver(tmp.path(), &[])
            .with_config_file(tmp.path().join("absent.toml"))
            .resolve(["switchyard"])
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_command_line_config_file_beats_builder() {
        let tmp = TempDir::new().unwrap();
        let chosen = tmp.path().join("chosen.toml");
        fs::write(&chosen, "port = \":1\"\n").unwrap();

        let config = resolver(tmp.path(), &[])
            .with_config_file(tmp.path().join("absent.toml"))
            .resolve(["switchyard", "-c", chosen.to_str().unwrap()])
            .unwrap();
        assert_eq!(config.port, ":1");
    }

    #[test]
    fn test_environment_without_file() {
        let tmp = TempDir::new().unwrap();
        let config = resolver(tmp.path(), &[("SWITCHYARD_ETCD_PREFIX", "/edge")])
            .resolve(["switchyard"])
            .unwrap();
        assert_eq!(config.etcd.unwrap().prefix, "/edge");
    }

    #[test]
    fn test_environment_error_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = resolver(tmp.path(), &[("SWITCHYARD_WEB_READONLY", "perhaps")])
            .resolve(["switchyard"])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_file_type_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("switchyard.toml");
        fs::write(&path, "logLevel = \"chatty\"\n").unwrap();

        let err = resolver(tmp.path(), &[])
            .resolve(["switchyard", "--logLevel", "INFO"])
            .unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => assert_eq!(origin, path.display().to_string()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
