//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration from defaults, file, environment and flags
//! - Switch logging to the configured level
//! - Report what was resolved
//!
//! # Design Decisions
//! - Fail fast: any resolution error is fatal
//! - The resolved configuration is returned by value and never mutated
//!   afterwards; components receive it by reference

use std::ffi::OsString;

use crate::config::{ConfigError, GlobalConfiguration, Resolver};
use crate::observability::logging::LogHandle;

/// Resolve the process configuration from `argv` (program name first),
/// apply its log level and log a summary.
pub fn resolve_configuration<I, T>(
    resolver: &Resolver,
    argv: I,
    log: &LogHandle,
) -> Result<GlobalConfiguration, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = resolver.resolve(argv)?;
    log.apply(config.log_level);
    log_summary(&config);
    Ok(config)
}

fn log_summary(config: &GlobalConfiguration) {
    let providers = config.enabled_providers();
    tracing::info!(
        port = %config.port,
        grace_time_out = ?config.grace_time_out,
        log_level = %config.log_level,
        providers_throttle_duration = ?config.providers_throttle_duration,
        certificates = config.certificates.len(),
        providers = ?providers,
        "Configuration loaded"
    );
    if providers.is_empty() {
        tracing::warn!("No provider enabled");
    }
}
