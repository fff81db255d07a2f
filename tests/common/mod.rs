//! Shared utilities for resolution tests.

use std::fs;
use std::path::{Path, PathBuf};

use switchyard::config::{ConfigLoader, Environment, Resolver, SearchPaths};
use tempfile::TempDir;

/// A throwaway search directory with an optional configuration file.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write `switchyard.<ext>` into the search directory.
    pub fn with_file(self, ext: &str, content: &str) -> Self {
        fs::write(self.path().join(format!("switchyard.{}", ext)), content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, ext: &str) -> PathBuf {
        self.path().join(format!("switchyard.{}", ext))
    }

    /// Resolver searching only this directory, with the given environment.
    pub fn resolver(&self, env: &[(&str, &str)]) -> Resolver {
        Resolver::with_loader(ConfigLoader::new(
            SearchPaths::new("switchyard", vec![self.path().to_path_buf()]),
            Environment::from_pairs("SWITCHYARD_", env.iter().copied()),
        ))
    }
}

/// `argv` with the program name prepended.
#[allow(dead_code)]
pub fn argv<'a>(args: &[&'a str]) -> Vec<&'a str> {
    std::iter::once("switchyard").chain(args.iter().copied()).collect()
}
