//! Command-line argument overlay.
//!
//! The flag set is generated from the field descriptor table: one
//! `--<path>` flag per field (with short forms for the common globals),
//! provider flags grouped under a heading per provider, and a repeatable
//! `--cert.certFile`/`--cert.keyFile` pair for the certificate list.
//!
//! Flags carry the same defaults as the default factory for display, but
//! only flags actually present on the command line end up in the overlay,
//! so a flag left at its default never hides a file or environment value.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::config::error::ConfigError;
use crate::config::fields::{self, FieldDescriptor, FieldKind};
use crate::config::layer;
use crate::config::schema::GlobalConfiguration;
use crate::config::SERVICE_NAME;

const CONFIG_FILE: &str = "configFile";
const CERT_FILE: &str = "cert.certFile";
const KEY_FILE: &str = "cert.keyFile";

/// The command-line interface.
pub fn command() -> Command {
    let mut command = Command::new(SERVICE_NAME)
        .version(clap::crate_version!())
        .about("Layered configuration for the switchyard reverse proxy")
        .arg(
            Arg::new(CONFIG_FILE)
                .short('c')
                .long(CONFIG_FILE)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file or directory to load instead of the standard locations"),
        );

    for field in fields::FIELDS {
        command = match field.kind {
            FieldKind::Certificates => command.args(certificate_flags(field)),
            _ => command.arg(flag(field)),
        };
    }
    command
}

fn flag(field: &'static FieldDescriptor) -> Arg {
    let kind = field.kind;
    let mut arg = Arg::new(field.path)
        .long(field.path)
        .help(field.help)
        .value_name(kind.value_name())
        .value_parser(move |raw: &str| kind.parse(raw));

    if let Some(short) = field.short {
        arg = arg.short(short);
    }
    if let Some(default) = field.default {
        arg = arg.default_value(default);
    }
    if let Some(group) = field.group {
        arg = arg.help_heading(group);
    }
    if kind.is_flag_like() {
        arg = arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true");
    }
    arg
}

fn certificate_flags(field: &'static FieldDescriptor) -> [Arg; 2] {
    let heading = field.group.unwrap_or("Certificates");
    [
        Arg::new(CERT_FILE)
            .long(CERT_FILE)
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .action(ArgAction::Append)
            .help_heading(heading)
            .help("TLS certificate file; repeat for several pairs"),
        Arg::new(KEY_FILE)
            .long(KEY_FILE)
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .action(ArgAction::Append)
            .help_heading(heading)
            .help("TLS key file, paired in order with --cert.certFile"),
    ]
}

/// Values explicitly supplied on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentOverlay {
    explicit: Value,
    config_file: Option<PathBuf>,
}

impl ArgumentOverlay {
    /// Sparse tree of the fields present on the command line.
    pub fn explicit(&self) -> &Value {
        &self.explicit
    }

    pub fn into_explicit(self) -> Value {
        self.explicit
    }

    /// Path given with `-c/--configFile`.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Whether no configuration field was given.
    pub fn is_empty(&self) -> bool {
        self.explicit.as_object().map_or(true, |map| map.is_empty())
    }

    /// The command line decoded on its own, on top of the defaults.
    pub fn configuration(&self) -> Result<GlobalConfiguration, ConfigError> {
        layer::decode(self.explicit.clone(), "command line")
    }
}

/// Parse `argv` (program name first, as in `std::env::args_os`).
///
/// Help and version requests come back as `ConfigError::Arguments`; see
/// `ConfigError::is_help_request`.
pub fn parse_arguments<I, T>(argv: I) -> Result<ArgumentOverlay, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = command();
    let matches = command.try_get_matches_from_mut(argv)?;

    let mut explicit = layer::empty();
    for field in fields::overlay_order() {
        if field.kind == FieldKind::Certificates {
            if let Some(certificates) = certificate_pairs(&mut command, &matches)? {
                layer::assign(&mut explicit, field, certificates);
            }
            continue;
        }
        if matches.value_source(field.path) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<Value>(field.path) {
            layer::assign(&mut explicit, field, value.clone());
        }
    }

    Ok(ArgumentOverlay {
        explicit,
        config_file: matches.get_one::<PathBuf>(CONFIG_FILE).cloned(),
    })
}

fn certificate_pairs(
    command: &mut Command,
    matches: &ArgMatches,
) -> Result<Option<Value>, ConfigError> {
    let certs: Vec<&PathBuf> = matches
        .get_many::<PathBuf>(CERT_FILE)
        .map(Iterator::collect)
        .unwrap_or_default();
    let keys: Vec<&PathBuf> = matches
        .get_many::<PathBuf>(KEY_FILE)
        .map(Iterator::collect)
        .unwrap_or_default();

    if certs.is_empty() && keys.is_empty() {
        return Ok(None);
    }
    if certs.len() != keys.len() {
        let message = format!(
            "--{} was given {} time(s) but --{} {} time(s); they must be paired",
            CERT_FILE,
            certs.len(),
            KEY_FILE,
            keys.len()
        );
        return Err(command.error(ErrorKind::WrongNumberOfValues, message).into());
    }

    let entries = certs
        .iter()
        .zip(&keys)
        .map(|(cert, key)| {
            fields::certificate_entry(&cert.to_string_lossy(), &key.to_string_lossy())
        })
        .collect();
    Ok(Some(Value::Array(entries)))
}
