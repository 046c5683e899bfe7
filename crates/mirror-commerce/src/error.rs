//! Commerce error types.

use thiserror::Error;

/// Errors raised by the catalog store and search service.
///
/// The palindrome, discount and predicate functions never fail; these errors
/// come from storage and input validation around them.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Store failure not tied to a database.
    #[error("Store error: {0}")]
    StoreError(String),
}

#[cfg(feature = "storage")]
impl From<mirror_db::DbError> for CommerceError {
    fn from(e: mirror_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
