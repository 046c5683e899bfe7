//! Core abstractions shared by the MirrorShop crates.
//!
//! This crate provides:
//! - `RequestContext` - Typed request data (method, path, query, headers)
//! - `RequestId` - Unique request identifier for log correlation
//! - `TimingContext` - Request timing for response metadata
//! - `AppConfig` - Application configuration loaded from TOML and environment

mod config;
mod context;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
