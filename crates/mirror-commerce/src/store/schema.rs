//! SQLite schema for the `products` table.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::catalog::NewProduct;
use crate::search::SearchPredicate;

/// Table definition.
pub const CREATE_PRODUCTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    brand TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL,
    image_url TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
)";

/// Columns aliased to the JSON field names of `Product`, so rows
/// deserialize straight into it.
pub const SELECT_COLUMNS: &str =
    "id, title, brand, description, price, image_url AS imageUrl, created_at AS createdAt";

/// Parameterized insert; bind title, brand, description, price, image_url,
/// created_at.
pub const INSERT_PRODUCT: &str = "INSERT INTO products \
    (title, brand, description, price, image_url, created_at) VALUES (?, ?, ?, ?, ?, ?)";

/// Newest first, ties broken by id.
pub const ORDER_NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Query selecting every product accepted by `predicate`.
pub fn select_matching(predicate: &SearchPredicate) -> (String, Vec<String>) {
    let (clause, params) = predicate.to_sql();
    (
        format!("SELECT {SELECT_COLUMNS} FROM products WHERE {clause} {ORDER_NEWEST_FIRST}"),
        params,
    )
}

/// Timestamp format stored in `created_at`. Fixed width, so text order is
/// chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A self-contained `INSERT` statement with literal values, for seed scripts.
pub fn render_insert(product: &NewProduct, created_at: DateTime<Utc>) -> String {
    format!(
        "INSERT INTO products (title, brand, description, price, image_url, created_at) \
         VALUES ({}, {}, {}, {}, {}, {});",
        quote(&product.title),
        quote(&product.brand),
        quote(&product.description),
        product.price,
        quote(&product.image_url),
        quote(&format_timestamp(created_at)),
    )
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::build_search_predicate;
    use chrono::TimeZone;

    #[test]
    fn test_select_all() {
        let (sql, params) = select_matching(&build_search_predicate(""));
        assert!(sql.starts_with("SELECT id, title"));
        assert!(sql.contains("WHERE 1=1 ORDER BY created_at DESC"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_substring() {
        let (sql, params) = select_matching(&build_search_predicate("abba"));
        assert!(sql.contains("LOWER(description) LIKE ?"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_render_insert_quotes_text() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let product = NewProduct::new("Rock 'n' Roll", "ABBA", 19.5);
        let sql = render_insert(&product, at);
        assert!(sql.contains("'Rock ''n'' Roll'"));
        assert!(sql.contains("19.5"));
        assert!(sql.contains("'2024-01-02T03:04:05.000000Z'"));
        assert!(sql.ends_with(");"));
    }
}
