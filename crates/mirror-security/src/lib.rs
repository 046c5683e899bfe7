//! Security infrastructure for MirrorShop.
//!
//! This crate provides:
//! - `Throttle` - Per-client global and search token buckets built from `[throttle]`
//! - `BucketStore` - Where buckets live between requests (`MemoryBucketStore`,
//!   or `KvBucketStore` on Spin)
//! - `SecurityHeaders` - CORS and hardening response headers built from `[security]`

mod headers;
mod limits;

#[cfg(target_arch = "wasm32")]
mod kv;

pub use headers::*;
pub use limits::*;

#[cfg(target_arch = "wasm32")]
pub use kv::KvBucketStore;
