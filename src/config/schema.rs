//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits so the same shapes are used for files,
//! merged overlays and the encoded output.
//!
//! `GlobalConfiguration::default()` is the default factory: every scalar
//! carries its declared default and every provider is absent.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration;

/// Root configuration for the reverse proxy.
///
/// Scalars come first and nested tables last so the value encodes cleanly
/// to TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalConfiguration {
    /// Listen address (e.g., ":80", "127.0.0.1:8000").
    pub port: String,

    /// Time given to active requests to finish during reloads.
    #[serde(with = "duration")]
    pub grace_time_out: Duration,

    /// Access log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_logs_file: Option<PathBuf>,

    /// Proxy log file. Logs go to stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_logs_file: Option<PathBuf>,

    /// Log level.
    pub log_level: LogLevel,

    /// Minimum delay between two provider events before a new
    /// configuration is applied.
    #[serde(with = "duration")]
    pub providers_throttle_duration: Duration,

    /// TLS certificate/key pairs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<Certificate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<Docker>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<File>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web: Option<Web>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marathon: Option<Marathon>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consul: Option<Consul>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd: Option<Etcd>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper: Option<Zookeeper>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boltdb: Option<Boltdb>,
}

impl Default for GlobalConfiguration {
    fn default() -> Self {
        Self {
            port: ":80".to_string(),
            grace_time_out: Duration::from_secs(10),
            access_logs_file: None,
            proxy_logs_file: None,
            log_level: LogLevel::Error,
            providers_throttle_duration: Duration::from_secs(2),
            certificates: Vec::new(),
            docker: None,
            file: None,
            web: None,
            marathon: None,
            consul: None,
            etcd: None,
            zookeeper: None,
            boltdb: None,
        }
    }
}

impl GlobalConfiguration {
    /// Names of the providers that are present, in declaration order.
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        let flags = [
            ("docker", self.docker.is_some()),
            ("file", self.file.is_some()),
            ("web", self.web.is_some()),
            ("marathon", self.marathon.is_some()),
            ("consul", self.consul.is_some()),
            ("etcd", self.etcd.is_some()),
            ("zookeeper", self.zookeeper.is_some()),
            ("boltdb", self.boltdb.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect()
    }

    /// Encode the configuration in the TOML file format.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// A TLS certificate/key pair. Both are file references, not contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Path to certificate file (PEM).
    pub cert_file: PathBuf,

    /// Path to private key file (PEM).
    pub key_file: PathBuf,
}

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Panic => "PANIC",
        }
    }

    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    ///
    /// tracing has no level above `error`, so FATAL and PANIC collapse
    /// onto it.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("warning") {
            return Ok(LogLevel::Warn);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| {
                format!(
                    "invalid log level '{}' (expected one of DEBUG, INFO, WARN, ERROR, FATAL, PANIC)",
                    raw
                )
            })
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Docker provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Docker {
    /// Watch the daemon for container events.
    pub watch: bool,

    /// Docker daemon endpoint.
    pub endpoint: String,

    /// Default domain used for generated frontend rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Template file overriding the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for Docker {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "unix:///var/run/docker.sock".to_string(),
            domain: None,
            filename: None,
        }
    }
}

/// File provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct File {
    /// Reload when the file changes.
    pub watch: bool,

    /// Backend definitions file. The main configuration file is used when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for File {
    fn default() -> Self {
        Self {
            watch: true,
            filename: None,
        }
    }
}

/// Web (API and dashboard) provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Web {
    /// Listen address of the API.
    pub address: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    /// Reject configuration changes through the API.
    pub read_only: bool,
}

impl Default for Web {
    fn default() -> Self {
        Self {
            address: ":8080".to_string(),
            cert_file: None,
            key_file: None,
            read_only: false,
        }
    }
}

/// Marathon provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Marathon {
    pub watch: bool,

    /// Marathon server endpoint.
    pub endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,

    /// Network interface used to reach tasks.
    pub network_interface: String,
}

impl Default for Marathon {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "http://127.0.0.1:8080".to_string(),
            domain: None,
            filename: None,
            network_interface: "eth0".to_string(),
        }
    }
}

/// Consul key/value provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Consul {
    pub watch: bool,
    pub endpoint: String,
    /// Key prefix holding the proxy configuration.
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for Consul {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "127.0.0.1:8500".to_string(),
            prefix: "/switchyard".to_string(),
            filename: None,
        }
    }
}

/// Etcd key/value provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Etcd {
    pub watch: bool,
    pub endpoint: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for Etcd {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "127.0.0.1:4001".to_string(),
            prefix: "/switchyard".to_string(),
            filename: None,
        }
    }
}

/// Zookeeper key/value provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Zookeeper {
    pub watch: bool,
    pub endpoint: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for Zookeeper {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "127.0.0.1:2181".to_string(),
            prefix: "/switchyard".to_string(),
            filename: None,
        }
    }
}

/// BoltDB embedded key/value provider. The endpoint is a database file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Boltdb {
    pub watch: bool,
    pub endpoint: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

impl Default for Boltdb {
    fn default() -> Self {
        Self {
            watch: true,
            endpoint: "/var/lib/switchyard/switchyard.db".to_string(),
            prefix: "/switchyard".to_string(),
            filename: None,
        }
    }
}
