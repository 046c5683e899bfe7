//! Product catalog module.
//!
//! Contains product records and the demo catalog used to seed empty stores.

mod product;
mod seed;

pub use product::{NewProduct, Product, ProductWithDiscount};
pub use seed::{demo_catalog, seed_if_empty};
