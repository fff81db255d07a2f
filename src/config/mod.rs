//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! schema.rs (GlobalConfiguration::default)
//!     → loader.rs (locate & parse file, canonical keys)
//!     → env.rs (SWITCHYARD_* overrides, same decode pass)
//!     → args.rs (flags present on the command line)
//!     → resolver.rs (merge in precedence order, decode)
//!     → GlobalConfiguration (immutable, handed to the rest of the proxy)
//! ```
//!
//! # Design Decisions
//! - Every layer is a sparse tree holding only what it mentions; fields.rs
//!   is the single table of names, defaults and validators behind them
//! - Providers are `Option`s: absent means disabled, present means fully
//!   populated with provider defaults
//! - Config is resolved once at startup; changes require a restart

pub mod args;
pub mod duration;
pub mod env;
pub mod error;
pub mod fields;
pub mod layer;
pub mod loader;
pub mod resolver;
pub mod schema;

/// Service name: configuration file stem and directory names.
pub const SERVICE_NAME: &str = "switchyard";

/// Prefix of the environment variables read by the environment overlay.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

pub use args::{parse_arguments, ArgumentOverlay};
pub use env::Environment;
pub use error::ConfigError;
pub use loader::{load_config, ConfigLoader, SearchPaths};
pub use resolver::Resolver;
pub use schema::{
    Boltdb, Certificate, Consul, Docker, Etcd, File, GlobalConfiguration, LogLevel, Marathon, Web,
    Zookeeper,
};
