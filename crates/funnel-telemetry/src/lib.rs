//! Logging setup for funnel binaries.
//!
//! Human-readable or JSON output via `tracing-subscriber`, with `RUST_LOG`
//! taking precedence over the configured level.

pub mod logging;
