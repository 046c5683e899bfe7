//! Product storage.
//!
//! [`ProductStore`] is the seam between the search service and wherever
//! products live. [`InMemoryStore`] evaluates predicates directly; with the
//! `storage` feature, `SqlProductStore` renders them to SQL for SQLite.

mod memory;
pub mod schema;
#[cfg(feature = "storage")]
mod sql;

use std::sync::Arc;

use crate::catalog::{NewProduct, Product};
use crate::error::CommerceError;
use crate::search::SearchPredicate;

pub use memory::InMemoryStore;
#[cfg(feature = "storage")]
pub use sql::SqlProductStore;

/// Read/write access to the product catalog.
///
/// Listings are ordered newest first.
pub trait ProductStore: Send + Sync {
    /// Every product.
    fn find_all(&self) -> Result<Vec<Product>, CommerceError>;

    /// Products accepted by `predicate`.
    fn find_matching(&self, predicate: &SearchPredicate) -> Result<Vec<Product>, CommerceError>;

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, CommerceError>;

    fn count(&self) -> Result<u64, CommerceError>;

    /// Store a product, assigning its id and creation time.
    fn insert(&self, product: NewProduct) -> Result<Product, CommerceError>;
}

impl<S: ProductStore + ?Sized> ProductStore for Box<S> {
    fn find_all(&self) -> Result<Vec<Product>, CommerceError> {
        (**self).find_all()
    }

    fn find_matching(&self, predicate: &SearchPredicate) -> Result<Vec<Product>, CommerceError> {
        (**self).find_matching(predicate)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, CommerceError> {
        (**self).find_by_id(id)
    }

    fn count(&self) -> Result<u64, CommerceError> {
        (**self).count()
    }

    fn insert(&self, product: NewProduct) -> Result<Product, CommerceError> {
        (**self).insert(product)
    }
}

impl<S: ProductStore + ?Sized> ProductStore for Arc<S> {
    fn find_all(&self) -> Result<Vec<Product>, CommerceError> {
        (**self).find_all()
    }

    fn find_matching(&self, predicate: &SearchPredicate) -> Result<Vec<Product>, CommerceError> {
        (**self).find_matching(predicate)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, CommerceError> {
        (**self).find_by_id(id)
    }

    fn count(&self) -> Result<u64, CommerceError> {
        (**self).count()
    }

    fn insert(&self, product: NewProduct) -> Result<Product, CommerceError> {
        (**self).insert(product)
    }
}
