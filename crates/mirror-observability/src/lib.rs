//! Observability for MirrorShop.
//!
//! This crate provides:
//! - `StructuredLogger` - Per-request JSON/human log lines with request ID correlation
//! - `init_tracing` - `tracing` subscriber setup driven by the logging config

mod logging;
mod subscriber;

pub use logging::*;
pub use subscriber::*;
