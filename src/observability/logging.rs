//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber before configuration is resolved
//! - Switch to the configured log level once it is known
//!
//! # Design Decisions
//! - `RUST_LOG`, when set, always wins over the configured level
//! - Logs go to stderr; stdout carries command output

use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LogLevel;

/// Filter used until the configuration has been resolved.
const BOOTSTRAP_FILTER: &str = "warn";

/// Handle to adjust the log filter after initialization.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Install the global subscriber. Call once, at process start.
pub fn init() -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(BOOTSTRAP_FILTER), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle {
        filter: handle,
        from_env,
    }
}

impl LogHandle {
    /// Apply the configured level unless `RUST_LOG` took over.
    pub fn apply(&self, level: LogLevel) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.filter.reload(EnvFilter::new(level.directive())) {
            tracing::warn!(error = %e, "Failed to apply configured log level");
        }
    }
}
