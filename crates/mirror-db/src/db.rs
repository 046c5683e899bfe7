//! Database connection and query execution.

use crate::{DbError, QueryResult, Value};
use serde::de::DeserializeOwned;

/// SQLite database connection.
pub struct Db {
    #[cfg(target_arch = "wasm32")]
    conn: spin_sdk::sqlite::Connection,
    #[cfg(not(target_arch = "wasm32"))]
    _phantom: std::marker::PhantomData<()>,
}

#[cfg(target_arch = "wasm32")]
impl Db {
    /// Open the default SQLite database of the Spin component.
    pub fn open_default() -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open_default()
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a named SQLite database.
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn = spin_sdk::sqlite::Connection::open(name)
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Execute a statement that doesn't return rows (DDL, INSERT, UPDATE).
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        self.run(sql, params).map(|_| ())
    }

    /// Execute a query and return the raw rows.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let result = self.run(sql, params)?;
        let columns: Vec<String> = result.columns.iter().map(|c| c.to_string()).collect();
        let rows = result
            .rows
            .iter()
            .map(|row| {
                let values = row.values.iter().map(from_spin_value).collect();
                crate::Row::new(columns.clone(), values)
            })
            .collect();

        Ok(QueryResult::new(columns, rows))
    }

    fn run(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<spin_sdk::sqlite::QueryResult, DbError> {
        let spin_params: Vec<spin_sdk::sqlite::Value> = params.iter().map(to_spin_value).collect();
        self.conn
            .execute(sql, spin_params.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
fn to_spin_value(value: &Value) -> spin_sdk::sqlite::Value {
    match value {
        Value::Null => spin_sdk::sqlite::Value::Null,
        Value::Integer(i) => spin_sdk::sqlite::Value::Integer(*i),
        Value::Real(f) => spin_sdk::sqlite::Value::Real(*f),
        Value::Text(s) => spin_sdk::sqlite::Value::Text(s.clone()),
        Value::Blob(b) => spin_sdk::sqlite::Value::Blob(b.clone()),
    }
}

#[cfg(target_arch = "wasm32")]
fn from_spin_value(value: &spin_sdk::sqlite::Value) -> Value {
    match value {
        spin_sdk::sqlite::Value::Null => Value::Null,
        spin_sdk::sqlite::Value::Integer(i) => Value::Integer(*i),
        spin_sdk::sqlite::Value::Real(f) => Value::Real(*f),
        spin_sdk::sqlite::Value::Text(s) => Value::Text(s.clone()),
        spin_sdk::sqlite::Value::Blob(b) => Value::Blob(b.clone()),
    }
}

// Native builds have no SQLite host; statements are accepted and queries
// come back empty.
#[cfg(not(target_arch = "wasm32"))]
impl Db {
    pub fn open_default() -> Result<Self, DbError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn open(_name: &str) -> Result<Self, DbError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn execute(&self, _sql: &str, _params: &[Value]) -> Result<(), DbError> {
        Ok(())
    }

    pub fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult, DbError> {
        Ok(QueryResult::new(vec![], vec![]))
    }
}

impl Db {
    /// Execute a query and deserialize every row.
    ///
    /// ```rust,ignore
    /// let products: Vec<ProductRow> = db.query_as(
    ///     "SELECT * FROM products WHERE LOWER(title) = ?",
    ///     params!["level"],
    /// )?;
    /// ```
    pub fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params)?.deserialize_all()
    }

    /// Execute a query and deserialize the first row, if any.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        match self.query(sql, params)?.first() {
            Some(row) => Ok(Some(row.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Execute a query and deserialize exactly one row.
    pub fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        self.query_optional(sql, params)?.ok_or(DbError::NotFound)
    }
}
