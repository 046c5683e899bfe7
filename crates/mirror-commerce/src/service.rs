//! Search orchestration.
//!
//! Runs the predicate against a store and prices every hit with the raw
//! search term. Matching uses the trimmed, lowercased term; pricing uses the
//! term exactly as received, and the palindrome check normalizes it on its
//! own.

use tracing::{debug, info, warn};

use crate::catalog::{Product, ProductWithDiscount};
use crate::discount::PALINDROME_DISCOUNT_PERCENT;
use crate::error::CommerceError;
use crate::palindrome::is_palindrome;
use crate::search::{build_search_predicate, SearchResponse};
use crate::store::ProductStore;

/// Product queries over a store.
#[derive(Debug)]
pub struct ProductService<S> {
    store: S,
}

impl<S: ProductStore> ProductService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Search products and apply the palindrome discount.
    ///
    /// An empty (or whitespace-only) term returns every product at full
    /// price with `is_palindrome == false`.
    pub fn search_products(&self, search_term: &str) -> Result<SearchResponse, CommerceError> {
        let predicate = build_search_predicate(search_term);

        if predicate.is_unfiltered() {
            let products: Vec<ProductWithDiscount> = self
                .store
                .find_all()?
                .iter()
                .map(Product::undiscounted)
                .collect();
            debug!(results = products.len(), "empty search term, listing catalog");
            return Ok(response(products, false, search_term));
        }

        let is_palindrome = is_palindrome(search_term);
        let products: Vec<ProductWithDiscount> = self
            .store
            .find_matching(&predicate)?
            .iter()
            .map(|product| product.priced_for(search_term))
            .collect();

        info!(
            term = search_term,
            mode = predicate.mode(),
            results = products.len(),
            is_palindrome,
            "search completed"
        );
        Ok(response(products, is_palindrome, search_term))
    }

    /// Every product, newest first.
    pub fn find_all(&self) -> Result<Vec<Product>, CommerceError> {
        self.store.find_all()
    }

    /// One product by id.
    pub fn find_one(&self, id: i64) -> Result<Product, CommerceError> {
        match self.store.find_by_id(id)? {
            Some(product) => Ok(product),
            None => {
                warn!(id, "product not found");
                Err(CommerceError::ProductNotFound(id))
            }
        }
    }
}

fn response(
    products: Vec<ProductWithDiscount>,
    is_palindrome: bool,
    search_term: &str,
) -> SearchResponse {
    SearchResponse {
        total_results: products.len(),
        products,
        is_palindrome,
        discount_applied: if is_palindrome {
            PALINDROME_DISCOUNT_PERCENT
        } else {
            0
        },
        search_term: search_term.to_string(),
        meta: None,
    }
}
