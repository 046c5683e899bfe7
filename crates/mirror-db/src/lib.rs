//! Type-safe SQLite database layer for MirrorShop.
//!
//! Wraps Spin's SQLite connection with owned parameter/result types so the
//! product store can build queries without touching the host API directly.
//! Outside of wasm32 the connection is an inert stub: statements succeed and
//! queries return no rows, which keeps native builds and tests free of a
//! database.
//!
//! # Example
//!
//! ```rust,ignore
//! use mirror_db::{Db, params};
//!
//! let db = Db::open_default()?;
//! db.execute(
//!     "INSERT INTO products (title, brand, price) VALUES (?, ?, ?)",
//!     params!["Monitor 4K", "DisplayTech", 399.99],
//! )?;
//!
//! let count = db.query("SELECT COUNT(*) AS count FROM products", params![])?
//!     .single_integer()?;
//! ```

mod db;
mod error;
mod types;

pub use db::Db;
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Value};
}

/// Create a parameter list for SQL queries.
///
/// ```
/// use mirror_db::{params, Value};
///
/// let params: &[Value] = params!["abba", 42, 0.5];
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
