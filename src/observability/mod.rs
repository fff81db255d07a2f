//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → logging.rs (bootstrap filter from RUST_LOG or "warn")
//!     → configuration resolved
//!     → logging.rs (filter reloaded to the configured logLevel)
//! ```

pub mod logging;
