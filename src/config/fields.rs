//! Field descriptor table.
//!
//! One entry per settable configuration field. The same table drives the
//! environment overlay, the command-line flags and case-insensitive
//! matching of file keys, so a field's name, default and validator are
//! declared exactly once.

use serde_json::{json, Map, Value};

use crate::config::duration;
use crate::config::schema::LogLevel;

use FieldKind::{Bool, Path, Text};

/// Key of the certificate list, and the keys of each of its entries.
pub const CERTIFICATES: &str = "certificates";
pub const CERTIFICATE_KEYS: [&str; 2] = ["certFile", "keyFile"];

/// How a raw textual value is validated and typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string.
    Text,
    /// Filesystem path.
    Path,
    Bool,
    Duration,
    LogLevel,
    /// Enables (`true`) or removes (`false`) a provider namespace.
    Switch,
    /// `cert,key;cert,key` list of certificate pairs.
    Certificates,
}

impl FieldKind {
    /// Validate `raw` and convert it to the value stored in a
    /// configuration tree.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            FieldKind::Text | FieldKind::Path => Ok(Value::String(raw.to_string())),
            FieldKind::Bool | FieldKind::Switch => parse_bool(raw).map(Value::Bool),
            FieldKind::Duration => {
                duration::parse(raw)?;
                Ok(Value::String(raw.trim().to_string()))
            }
            FieldKind::LogLevel => {
                let level: LogLevel = raw.parse()?;
                Ok(Value::String(level.as_str().to_string()))
            }
            FieldKind::Certificates => parse_certificates(raw),
        }
    }

    /// Placeholder shown in usage text.
    pub fn value_name(self) -> &'static str {
        match self {
            FieldKind::Text => "VALUE",
            FieldKind::Path => "PATH",
            FieldKind::Bool | FieldKind::Switch => "BOOL",
            FieldKind::Duration => "DURATION",
            FieldKind::LogLevel => "LEVEL",
            FieldKind::Certificates => "CERT,KEY;...",
        }
    }

    /// Whether the flag may be given without a value, meaning `true`.
    pub fn is_flag_like(self) -> bool {
        matches!(self, FieldKind::Bool | FieldKind::Switch)
    }
}

/// Declaration of a single configuration field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Dotted key path (e.g. "docker.endpoint"). Also the long flag name.
    pub path: &'static str,
    pub short: Option<char>,
    pub kind: FieldKind,
    /// Textual default; must agree with the `Default` impls in `schema`.
    pub default: Option<&'static str>,
    /// Help heading (provider or feature namespace).
    pub group: Option<&'static str>,
    pub help: &'static str,
}

impl FieldDescriptor {
    const fn global(path: &'static str, kind: FieldKind, help: &'static str) -> Self {
        Self {
            path,
            short: None,
            kind,
            default: None,
            group: None,
            help,
        }
    }

    const fn in_group(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    const fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    /// Environment variable carrying this field: the prefix followed by the
    /// upper-cased path with dots replaced by underscores.
    pub fn env_var(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.path.replace('.', "_").to_ascii_uppercase())
    }

    pub fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.path.split('.')
    }
}

const fn provider(path: &'static str, group: &'static str, help: &'static str) -> FieldDescriptor {
    FieldDescriptor::global(path, FieldKind::Switch, help).in_group(group)
}

const fn field(
    path: &'static str,
    group: &'static str,
    kind: FieldKind,
    help: &'static str,
) -> FieldDescriptor {
    FieldDescriptor::global(path, kind, help).in_group(group)
}

/// Every configuration field, globals first, then one block per provider
/// starting with its switch.
pub static FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::global("port", Text, "Reverse proxy listen address")
        .with_short('p')
        .with_default(":80"),
    FieldDescriptor::global(
        "graceTimeOut",
        FieldKind::Duration,
        "Duration given to active requests to finish during hot-reloads",
    )
    .with_short('g')
    .with_default("10s"),
    FieldDescriptor::global("accessLogsFile", Path, "Access logs file"),
    FieldDescriptor::global(
        "proxyLogsFile",
        Path,
        "Proxy logs file. If not defined, logs to stdout",
    ),
    FieldDescriptor::global("logLevel", FieldKind::LogLevel, "Log level")
        .with_short('l')
        .with_default("ERROR"),
    FieldDescriptor::global(
        "providersThrottleDuration",
        FieldKind::Duration,
        "Minimum duration between two provider events before applying a new configuration",
    )
    .with_default("2s"),
    FieldDescriptor::global(
        CERTIFICATES,
        FieldKind::Certificates,
        "TLS certificate/key pairs",
    )
    .in_group("Certificates"),
    // Docker
    provider("docker", "Docker", "Enable the Docker provider"),
    field("docker.watch", "Docker", Bool, "Watch Docker events").with_default("true"),
    field("docker.endpoint", "Docker", Text, "Docker server endpoint")
        .with_default("unix:///var/run/docker.sock"),
    field("docker.domain", "Docker", Text, "Default domain for generated rules"),
    field("docker.filename", "Docker", Path, "Override default configuration template"),
    // File
    provider("file", "File", "Enable the file provider"),
    field("file.watch", "File", Bool, "Watch the file for changes").with_default("true"),
    field("file.filename", "File", Path, "Backends and frontends definition file"),
    // Web
    provider("web", "Web", "Enable the web API provider"),
    field("web.address", "Web", Text, "Web API listen address").with_default(":8080"),
    field("web.certFile", "Web", Path, "TLS certificate for the web API"),
    field("web.keyFile", "Web", Path, "TLS key for the web API"),
    field("web.readOnly", "Web", Bool, "Reject configuration changes through the API")
        .with_default("false"),
    // Marathon
    provider("marathon", "Marathon", "Enable the Marathon provider"),
    field("marathon.watch", "Marathon", Bool, "Watch Marathon changes").with_default("true"),
    field("marathon.endpoint", "Marathon", Text, "Marathon server endpoint")
        .with_default("http://127.0.0.1:8080"),
    field("marathon.domain", "Marathon", Text, "Default domain for generated rules"),
    field("marathon.filename", "Marathon", Path, "Override default configuration template"),
    field(
        "marathon.networkInterface",
        "Marathon",
        Text,
        "Network interface used to reach tasks",
    )
    .with_default("eth0"),
    // Consul
    provider("consul", "Consul", "Enable the Consul provider"),
    field("consul.watch", "Consul", Bool, "Watch Consul changes").with_default("true"),
    field("consul.endpoint", "Consul", Text, "Consul server endpoint")
        .with_default("127.0.0.1:8500"),
    field("consul.prefix", "Consul", Text, "Key prefix").with_default("/switchyard"),
    field("consul.filename", "Consul", Path, "Override default configuration template"),
    // Etcd
    provider("etcd", "Etcd", "Enable the Etcd provider"),
    field("etcd.watch", "Etcd", Bool, "Watch Etcd changes").with_default("true"),
    field("etcd.endpoint", "Etcd", Text, "Etcd server endpoint").with_default("127.0.0.1:4001"),
    field("etcd.prefix", "Etcd", Text, "Key prefix").with_default("/switchyard"),
    field("etcd.filename", "Etcd", Path, "Override default configuration template"),
    // Zookeeper
    provider("zookeeper", "Zookeeper", "Enable the Zookeeper provider"),
    field("zookeeper.watch", "Zookeeper", Bool, "Watch Zookeeper changes").with_default("true"),
    field("zookeeper.endpoint", "Zookeeper", Text, "Zookeeper server endpoint")
        .with_default("127.0.0.1:2181"),
    field("zookeeper.prefix", "Zookeeper", Text, "Key prefix").with_default("/switchyard"),
    field("zookeeper.filename", "Zookeeper", Path, "Override default configuration template"),
    // Boltdb
    provider("boltdb", "Boltdb", "Enable the BoltDB provider"),
    field("boltdb.watch", "Boltdb", Bool, "Watch BoltDB changes").with_default("true"),
    field("boltdb.endpoint", "Boltdb", Text, "BoltDB database file")
        .with_default("/var/lib/switchyard/switchyard.db"),
    field("boltdb.prefix", "Boltdb", Text, "Key prefix").with_default("/switchyard"),
    field("boltdb.filename", "Boltdb", Path, "Override default configuration template"),
];

/// Fields in the order overlays must apply them: plain fields first, then
/// provider switches, so that disabling a provider wins over setting one of
/// its fields in the same layer.
pub fn overlay_order() -> impl Iterator<Item = &'static FieldDescriptor> {
    let fields = FIELDS.iter().filter(|f| f.kind != FieldKind::Switch);
    let switches = FIELDS.iter().filter(|f| f.kind == FieldKind::Switch);
    fields.chain(switches)
}

/// Canonical spelling of `key` within `namespace` (`None` for the top
/// level), matched case-insensitively.
pub fn canonical_key(namespace: Option<&str>, key: &str) -> Option<&'static str> {
    FIELDS
        .iter()
        .filter_map(|f| match namespace {
            None => f.segments().next(),
            Some(ns) => f.path.strip_prefix(ns)?.strip_prefix('.'),
        })
        .find(|candidate| candidate.eq_ignore_ascii_case(key))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("invalid boolean '{}' (expected true or false)", other)),
    }
}

fn parse_certificates(raw: &str) -> Result<Value, String> {
    let mut entries = Vec::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (cert, key) = pair
            .split_once(',')
            .ok_or_else(|| format!("invalid certificate pair '{}' (expected CERT,KEY)", pair))?;
        let (cert, key) = (cert.trim(), key.trim());
        if cert.is_empty() || key.is_empty() {
            return Err(format!("invalid certificate pair '{}' (expected CERT,KEY)", pair));
        }
        entries.push(certificate_entry(cert, key));
    }
    Ok(Value::Array(entries))
}

/// Tree form of one certificate pair.
pub fn certificate_entry(cert: &str, key: &str) -> Value {
    let mut entry = Map::new();
    entry.insert(CERTIFICATE_KEYS[0].to_string(), json!(cert));
    entry.insert(CERTIFICATE_KEYS[1].to_string(), json!(key));
    Value::Object(entry)
}
