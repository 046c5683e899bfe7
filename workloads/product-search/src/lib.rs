//! Product search API workload.
//!
//! Serves the MirrorShop product API:
//! - `GET /api/v1/products/search?q=` - search with the palindrome discount
//! - `GET /api/v1/products` - every product, newest first
//! - `GET /api/v1/products/{id}` - one product
//!
//! Routing lives in [`router::handle`], a plain function over
//! [`RequestContext`](mirror_core::RequestContext) and [`ApiState`], so it
//! runs natively in tests. On wasm32 the Spin component wires it to the
//! component's SQLite database and keeps throttle buckets in Spin key-value
//! storage.

pub mod response;
pub mod router;
pub mod state;

#[cfg(target_arch = "wasm32")]
mod component;

pub use response::{ApiResponse, ErrorCode};
pub use router::{handle, reject_method, Route};
pub use state::ApiState;
