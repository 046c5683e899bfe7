//! Database value types and conversions.

use crate::DbError;
use base64::Engine;
use serde::de::DeserializeOwned;

/// A database value that can be used as a parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get the value as an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get the value as an f64.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get the value as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            // Blobs that are valid UTF-8 are treated as text, anything else is base64.
            Value::Blob(b) => match std::str::from_utf8(b) {
                Ok(s) => serde_json::Value::String(s.to_string()),
                Err(_) => serde_json::Value::String(
                    base64::engine::general_purpose::STANDARD.encode(b),
                ),
            },
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A row from a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Get a value by column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Deserialize the row by mapping column names to struct fields.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

/// Query result containing rows.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Deserialize all rows into a vector of a type.
    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(Row::deserialize).collect()
    }

    /// Read the first column of the first row as an integer.
    ///
    /// Intended for `SELECT COUNT(*)` style queries. An empty result counts
    /// as zero.
    pub fn single_integer(&self) -> Result<i64, DbError> {
        match self.first().and_then(|row| row.get_index(0)) {
            None => Ok(0),
            Some(value) => value
                .as_integer()
                .ok_or_else(|| DbError::TypeError(format!("expected integer, got {:?}", value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ProductRow {
        id: i64,
        title: String,
        price: f64,
        brand: Option<String>,
    }

    fn row(values: Vec<Value>) -> Row {
        Row::new(
            vec!["id".into(), "title".into(), "price".into(), "brand".into()],
            values,
        )
    }

    #[test]
    fn test_row_deserialize() {
        let row = row(vec![
            Value::Integer(7),
            Value::Text("level".into()),
            Value::Real(49.99),
            Value::Null,
        ]);

        let product: ProductRow = row.deserialize().unwrap();
        assert_eq!(
            product,
            ProductRow {
                id: 7,
                title: "level".into(),
                price: 49.99,
                brand: None,
            }
        );
    }

    #[test]
    fn test_row_get_by_name() {
        let row = row(vec![
            Value::Integer(1),
            Value::Text("Monitor 4K".into()),
            Value::Integer(399),
            Value::Text("DisplayTech".into()),
        ]);
        assert_eq!(row.get("brand").and_then(Value::as_text), Some("DisplayTech"));
        assert_eq!(row.get("price").and_then(Value::as_real), Some(399.0));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_single_integer() {
        let count = QueryResult::new(
            vec!["count".into()],
            vec![Row::new(vec!["count".into()], vec![Value::Integer(12)])],
        );
        assert_eq!(count.single_integer().unwrap(), 12);
        assert_eq!(QueryResult::default().single_integer().unwrap(), 0);

        let text = QueryResult::new(
            vec!["count".into()],
            vec![Row::new(vec!["count".into()], vec![Value::Text("x".into())])],
        );
        assert!(matches!(text.single_integer(), Err(DbError::TypeError(_))));
    }

    #[test]
    fn test_binary_blob_is_base64() {
        let row = Row::new(vec!["data".into()], vec![Value::Blob(vec![0xff, 0x00])]);
        let value: serde_json::Value = row.deserialize().unwrap();
        assert_eq!(value["data"], "/wA=");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("abba")), Value::Text("abba".into()));
        assert_eq!(Value::from(true), Value::Integer(1));
    }
}
