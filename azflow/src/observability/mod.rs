//! Logging setup.
//!
//! Stages log through `tracing` with structured fields; this module
//! installs the subscriber that renders them.

mod subscriber;

pub use subscriber::{default_directives, init_tracing, LogFormat};
