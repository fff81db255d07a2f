//! Configuration loading from disk.
//!
//! # Responsibilities
//! - Build the candidate list: explicit path, `/etc/<service>/`,
//!   `$HOME/.<service>`, current directory
//! - Pick the first `<service>.{toml,yaml,yml,json}` found
//! - Parse it by extension into a sparse tree with canonical keys
//! - Apply the environment overlay in the same decode pass
//!
//! # Design Decisions
//! - An explicit path must exist; it never falls through to the standard
//!   locations
//! - Parse failures are fatal, never replaced by defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::env::Environment;
use crate::config::error::ConfigError;
use crate::config::layer;
use crate::config::schema::GlobalConfiguration;
use crate::config::SERVICE_NAME;

/// Recognised extensions, in lookup order within a directory.
pub const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Ordered directories searched for the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPaths {
    stem: String,
    directories: Vec<PathBuf>,
}

impl SearchPaths {
    /// Search `directories` for `<stem>.<ext>`.
    pub fn new(stem: impl Into<String>, directories: Vec<PathBuf>) -> Self {
        Self {
            stem: stem.into(),
            directories,
        }
    }

    /// `/etc/<service>/`, `$HOME/.<service>`, then the working directory.
    pub fn standard(service: &str) -> Self {
        let mut directories = vec![PathBuf::from("/etc").join(service)];
        if let Some(home) = dirs::home_dir() {
            directories.push(home.join(format!(".{}", service)));
        }
        directories.push(PathBuf::from("."));
        Self::new(service, directories)
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Candidate files in priority order.
    pub fn candidates(&self, explicit: Option<&Path>) -> Vec<PathBuf> {
        match explicit {
            Some(path) if path.is_dir() => self.files_in(path).collect(),
            Some(path) => vec![path.to_path_buf()],
            None => self
                .directories
                .iter()
                .flat_map(|dir| self.files_in(dir))
                .collect(),
        }
    }

    fn files_in<'a>(&'a self, dir: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
        CONFIG_EXTENSIONS
            .iter()
            .map(move |ext| dir.join(format!("{}.{}", self.stem, ext)))
    }

    /// First existing candidate.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let searched = self.candidates(explicit);
        for candidate in &searched {
            debug!(path = %candidate.display(), "Probing configuration file");
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }
        Err(ConfigError::NotFound { searched })
    }
}

impl Default for SearchPaths {
    fn default() -> Self {
        Self::standard(SERVICE_NAME)
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct FileLayer {
    pub path: PathBuf,
    pub tree: Value,
}

/// Source reader: locates and parses the configuration file and applies
/// the environment overlay on top of it.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    search: SearchPaths,
    environment: Environment,
}

impl ConfigLoader {
    pub fn new(search: SearchPaths, environment: Environment) -> Self {
        Self {
            search,
            environment,
        }
    }

    /// Standard search locations and the process environment.
    pub fn standard() -> Self {
        Self::new(SearchPaths::default(), Environment::from_process())
    }

    pub fn search_paths(&self) -> &SearchPaths {
        &self.search
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Locate and parse the configuration file, without overlays.
    pub fn read_file_layer(&self, explicit: Option<&Path>) -> Result<FileLayer, ConfigError> {
        let path = self.search.locate(explicit)?;
        let tree = read_tree(&path)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(FileLayer { path, tree })
    }

    /// Load the configuration file and apply the environment overlay.
    ///
    /// Fails with `ConfigError::NotFound` when no file exists.
    pub fn load_from_file(&self, explicit: Option<&Path>) -> Result<GlobalConfiguration, ConfigError> {
        let FileLayer { path, mut tree } = self.read_file_layer(explicit)?;
        layer::merge(&mut tree, self.environment.overlay()?);
        layer::decode(tree, &path.display().to_string())
    }
}

/// Load exactly `path`, with no environment overlay.
pub fn load_config(path: &Path) -> Result<GlobalConfiguration, ConfigError> {
    let tree = read_tree(path)?;
    layer::decode(tree, &path.display().to_string())
}

/// Read and parse `path` by extension into a tree with canonical keys.
pub fn read_tree(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parse_error = |message: String| ConfigError::Parse {
        origin: path.display().to_string(),
        message,
    };

    if !CONFIG_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        });
    }
    if content.trim().is_empty() {
        return Ok(layer::empty());
    }

    let tree: Value = match extension.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        "json" => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        _ => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
    };

    match tree {
        // A YAML document holding only comments or `~`.
        Value::Null => Ok(layer::empty()),
        Value::Object(_) => layer::canonicalize(tree).map_err(parse_error),
        _ => Err(parse_error(
            "top level must be a table of configuration keys".to_string(),
        )),
    }
}
