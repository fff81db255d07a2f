//! Configuration resolution errors.
//!
//! Every variant is fatal at startup. Help and version requests travel as
//! `Arguments` so the binary can let clap print them and exit with status 0.

use std::path::PathBuf;

use clap::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file matched any search location.
    #[error("configuration file not found (searched: {})", display_paths(.searched))]
    NotFound {
        /// Every candidate path that was tried, in priority order.
        searched: Vec<PathBuf>,
    },

    /// A located file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a known format.
    #[error("unsupported configuration format '.{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Malformed syntax, or a value whose type does not match its field.
    #[error("invalid configuration in {origin}: {message}")]
    Parse {
        /// File path, environment variable or "command line".
        origin: String,
        message: String,
    },

    /// Unknown flag, malformed flag value, or a help/version request.
    #[error(transparent)]
    Arguments(#[from] clap::Error),
}

impl ConfigError {
    /// Whether this is a request for help or version output rather than a
    /// failure.
    pub fn is_help_request(&self) -> bool {
        matches!(
            self,
            ConfigError::Arguments(e)
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_candidates() {
        let err = ConfigError::NotFound {
            searched: vec![
                PathBuf::from("/etc/switchyard/switchyard.toml"),
                PathBuf::from("./switchyard.toml"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "configuration file not found (searched: /etc/switchyard/switchyard.toml, ./switchyard.toml)"
        );
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = ConfigError::Parse {
            origin: "environment variable SWITCHYARD_PORT".to_string(),
            message: "bad".to_string(),
        };
        assert!(err.to_string().contains("SWITCHYARD_PORT"));
        assert!(!err.is_help_request());
    }
}
