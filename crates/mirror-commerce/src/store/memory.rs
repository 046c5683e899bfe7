//! In-memory product store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::ProductStore;
use crate::catalog::{seed_if_empty, NewProduct, Product};
use crate::error::CommerceError;
use crate::search::SearchPredicate;

/// Products held in a vector behind a lock.
#[derive(Debug)]
pub struct InMemoryStore {
    rows: RwLock<Vec<Product>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// A store holding the demo catalog.
    pub fn seeded() -> Result<Self, CommerceError> {
        let store = Self::new();
        seed_if_empty(&store)?;
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Product>> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Product>> {
        self.rows.write().unwrap_or_else(|e| e.into_inner())
    }

    fn collect_newest_first<F>(&self, keep: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let mut products: Vec<Product> = self.read().iter().filter(|p| keep(p)).cloned().collect();
        products.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        products
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStore for InMemoryStore {
    fn find_all(&self) -> Result<Vec<Product>, CommerceError> {
        Ok(self.collect_newest_first(|_| true))
    }

    fn find_matching(&self, predicate: &SearchPredicate) -> Result<Vec<Product>, CommerceError> {
        Ok(self.collect_newest_first(|p| predicate.matches(p)))
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, CommerceError> {
        Ok(self.read().iter().find(|p| p.id == id).cloned())
    }

    fn count(&self) -> Result<u64, CommerceError> {
        Ok(self.read().len() as u64)
    }

    fn insert(&self, product: NewProduct) -> Result<Product, CommerceError> {
        product.validate()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let product = product.into_product(id, Utc::now());
        self.write().push(product.clone());
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::build_search_predicate;

    #[test]
    fn test_insert_assigns_ids() {
        let store = InMemoryStore::new();
        let a = store.insert(NewProduct::new("Monitor 4K", "DisplayTech", 399.99)).unwrap();
        let b = store.insert(NewProduct::new("Webcam HD", "StreamPro", 129.99)).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.find_by_id(2).unwrap().unwrap().title, "Webcam HD");
        assert!(store.find_by_id(3).unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let store = InMemoryStore::new();
        let err = store.insert(NewProduct::new("", "X", 1.0)).unwrap_err();
        assert!(matches!(err, CommerceError::ValidationError(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_newest_first() {
        let store = InMemoryStore::seeded().unwrap();
        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0].title, "Cargador Inalámbrico");
        assert_eq!(all[11].title, "Auriculares ABBA Pro");
    }

    #[test]
    fn test_seeding_twice_is_noop() {
        let store = InMemoryStore::seeded().unwrap();
        assert_eq!(seed_if_empty(&store).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 12);
    }

    #[test]
    fn test_find_matching() {
        let store = InMemoryStore::seeded().unwrap();
        let titles: Vec<String> = store
            .find_matching(&build_search_predicate("ABBA"))
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Laptop Gaming", "Smartphone Premium", "Auriculares ABBA Pro"]
        );
    }
}
