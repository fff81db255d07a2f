//! Switchyard reverse proxy.
//!
//! # Startup
//!
//! ```text
//!   defaults ──▶ switchyard.{toml,yaml,json} ──▶ SWITCHYARD_* ──▶ --flags
//!                                                                    │
//!                                                                    ▼
//!                                                        GlobalConfiguration
//!                                                     (routing, TLS, providers)
//! ```
//!
//! The effective configuration is printed as TOML on stdout; logs go to
//! stderr. `--help` prints the generated usage and exits successfully.

use std::process::ExitCode;

use switchyard::config::{ConfigError, Resolver};
use switchyard::lifecycle::startup;
use switchyard::observability::logging;

fn main() -> ExitCode {
    let log = logging::init();

    let config = match startup::resolve_configuration(&Resolver::new(), std::env::args_os(), &log) {
        Ok(config) => config,
        // Prints usage or help; exits 0 for --help/--version, 2 otherwise.
        Err(ConfigError::Arguments(e)) => e.exit(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve configuration");
            return ExitCode::FAILURE;
        }
    };

    match config.to_toml() {
        Ok(encoded) => {
            print!("{}", encoded);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode configuration");
            ExitCode::FAILURE
        }
    }
}
