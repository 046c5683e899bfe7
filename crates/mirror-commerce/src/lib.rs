//! Palindrome discounts and product search for MirrorShop.
//!
//! Searches whose term is a palindrome get every matching product at half
//! price. This crate provides:
//!
//! - **Palindrome**: Unicode-aware normalization and palindrome detection
//! - **Discount**: The binary 50%-or-nothing price calculation
//! - **Search**: Tiered title/brand/description predicates and responses
//! - **Catalog**: Product records and the demo catalog
//! - **Store**: The `ProductStore` seam, in-memory and (with `storage`) SQLite
//! - **Service**: Search orchestration over a store
//!
//! # Example
//!
//! ```rust
//! use mirror_commerce::prelude::*;
//!
//! let service = ProductService::new(InMemoryStore::seeded()?);
//! let response = service.search_products("ABBA")?;
//!
//! assert!(response.is_palindrome);
//! assert_eq!(response.discount_applied, 50);
//! # Ok::<(), CommerceError>(())
//! ```

pub mod catalog;
pub mod discount;
pub mod error;
pub mod palindrome;
pub mod search;
pub mod service;
pub mod store;

pub use discount::{calculate_discounted_price, DiscountResult};
pub use error::CommerceError;
pub use palindrome::{is_palindrome, PalindromeVerdict};
pub use search::{build_search_predicate, SearchPredicate};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;

    // Core functions
    pub use crate::discount::{calculate_discounted_price, DiscountResult};
    pub use crate::palindrome::{check, is_palindrome, is_palindrome_value, PalindromeVerdict};
    pub use crate::search::{build_search_predicate, SearchMeta, SearchPredicate, SearchResponse};

    // Catalog
    pub use crate::catalog::{demo_catalog, seed_if_empty, NewProduct, Product, ProductWithDiscount};

    // Storage
    pub use crate::service::ProductService;
    pub use crate::store::{InMemoryStore, ProductStore};
    #[cfg(feature = "storage")]
    pub use crate::store::SqlProductStore;
}
