//! Switchyard reverse proxy: configuration resolution core.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigError, GlobalConfiguration, Resolver};
