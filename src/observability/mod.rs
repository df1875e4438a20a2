//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler / executor
//!     → tracing events (operation, error, target)
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Diagnostics are structured `tracing` events, never control flow
//! - Every failure event carries `operation` and `error` fields
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
