//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse flags → Locate file → Apply environment → Apply flags → Hand off
//! ```
//!
//! # Design Decisions
//! - Configuration is resolved once, before anything else starts
//! - No re-resolution without a process restart

pub mod startup;
