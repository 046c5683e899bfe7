//! SQLite-backed product store.

use chrono::Utc;
use mirror_db::{params, Db, Value};
use tracing::debug;

use super::schema::{
    format_timestamp, select_matching, CREATE_PRODUCTS_TABLE, INSERT_PRODUCT, SELECT_COLUMNS,
};
use super::ProductStore;
use crate::catalog::{NewProduct, Product};
use crate::error::CommerceError;
use crate::search::SearchPredicate;

/// Products stored in a SQLite `products` table.
pub struct SqlProductStore {
    db: Db,
}

impl SqlProductStore {
    /// Wrap a connection, creating the table if needed.
    pub fn new(db: Db) -> Result<Self, CommerceError> {
        db.execute(CREATE_PRODUCTS_TABLE, params![])?;
        Ok(Self { db })
    }

    /// Open the default database.
    pub fn open_default() -> Result<Self, CommerceError> {
        Self::new(Db::open_default()?)
    }

    /// Open a named database.
    pub fn open(name: &str) -> Result<Self, CommerceError> {
        Self::new(Db::open(name)?)
    }
}

impl ProductStore for SqlProductStore {
    fn find_all(&self) -> Result<Vec<Product>, CommerceError> {
        self.find_matching(&SearchPredicate::All)
    }

    fn find_matching(&self, predicate: &SearchPredicate) -> Result<Vec<Product>, CommerceError> {
        let (sql, params) = select_matching(predicate);
        let params: Vec<Value> = params.into_iter().map(Value::from).collect();
        debug!(mode = predicate.mode(), %sql, "querying products");
        Ok(self.db.query_as(&sql, &params)?)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Product>, CommerceError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?");
        Ok(self.db.query_optional(&sql, params![id])?)
    }

    fn count(&self) -> Result<u64, CommerceError> {
        let count = self
            .db
            .query("SELECT COUNT(*) AS count FROM products", params![])?
            .single_integer()?;
        Ok(count.max(0) as u64)
    }

    fn insert(&self, product: NewProduct) -> Result<Product, CommerceError> {
        product.validate()?;
        let created_at = Utc::now();
        self.db.execute(
            INSERT_PRODUCT,
            params![
                product.title.as_str(),
                product.brand.as_str(),
                product.description.as_str(),
                product.price,
                product.image_url.as_str(),
                format_timestamp(created_at),
            ],
        )?;

        let id = self
            .db
            .query("SELECT last_insert_rowid() AS id", params![])?
            .single_integer()?;
        Ok(product.into_product(id, created_at))
    }
}

impl std::fmt::Debug for SqlProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlProductStore").finish_non_exhaustive()
    }
}
