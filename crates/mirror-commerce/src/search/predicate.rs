//! Search predicate construction.
//!
//! Short terms only match a product title exactly; longer terms also match
//! anywhere inside the brand or description. All comparisons are
//! case-insensitive.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Terms up to this many characters only match titles exactly.
pub const EXACT_MATCH_MAX_LEN: usize = 3;

/// Escape character used in rendered `LIKE` patterns.
const LIKE_ESCAPE: char = '\\';

/// A declarative filter over product title, brand and description.
///
/// Terms stored in the predicate are already trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchPredicate {
    /// No filter.
    All,
    /// Title equals the term.
    Exact {
        #[serde(rename = "exactTitle")]
        exact_title: String,
    },
    /// Title equals the term, or brand/description contains it.
    ExactOrSubstring {
        #[serde(rename = "exactTitle")]
        exact_title: String,
        substring: String,
    },
}

/// Build the predicate for a raw search term.
///
/// ```
/// use mirror_commerce::search::{build_search_predicate, SearchPredicate};
///
/// assert_eq!(build_search_predicate("  "), SearchPredicate::All);
/// assert_eq!(build_search_predicate("ab").mode(), "exact");
/// assert_eq!(build_search_predicate("PHONE").mode(), "exact_or_substring");
/// ```
pub fn build_search_predicate(term: &str) -> SearchPredicate {
    let term = term.trim().to_lowercase();

    if term.is_empty() {
        SearchPredicate::All
    } else if term.chars().count() <= EXACT_MATCH_MAX_LEN {
        SearchPredicate::Exact { exact_title: term }
    } else {
        SearchPredicate::ExactOrSubstring {
            exact_title: term.clone(),
            substring: term,
        }
    }
}

impl SearchPredicate {
    /// Mode name as it appears in serialized form.
    pub fn mode(&self) -> &'static str {
        match self {
            SearchPredicate::All => "all",
            SearchPredicate::Exact { .. } => "exact",
            SearchPredicate::ExactOrSubstring { .. } => "exact_or_substring",
        }
    }

    pub fn exact_title(&self) -> Option<&str> {
        match self {
            SearchPredicate::All => None,
            SearchPredicate::Exact { exact_title }
            | SearchPredicate::ExactOrSubstring { exact_title, .. } => Some(exact_title),
        }
    }

    pub fn substring(&self) -> Option<&str> {
        match self {
            SearchPredicate::ExactOrSubstring { substring, .. } => Some(substring),
            _ => None,
        }
    }

    /// Whether this predicate filters anything out.
    pub fn is_unfiltered(&self) -> bool {
        matches!(self, SearchPredicate::All)
    }

    /// Evaluate against a product.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            SearchPredicate::All => true,
            SearchPredicate::Exact { exact_title } => title_equals(product, exact_title),
            SearchPredicate::ExactOrSubstring {
                exact_title,
                substring,
            } => {
                title_equals(product, exact_title)
                    || product.brand.to_lowercase().contains(substring.as_str())
                    || product.description.to_lowercase().contains(substring.as_str())
            }
        }
    }

    /// Build SQL WHERE clause component.
    ///
    /// `LIKE` wildcards in the term are escaped so the term matches
    /// literally. SQLite's `LOWER` only folds ASCII, so non-ASCII uppercase
    /// letters stored in the database are compared as-is.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        match self {
            SearchPredicate::All => ("1=1".to_string(), vec![]),
            SearchPredicate::Exact { exact_title } => {
                ("LOWER(title) = ?".to_string(), vec![exact_title.clone()])
            }
            SearchPredicate::ExactOrSubstring {
                exact_title,
                substring,
            } => {
                let pattern = format!("%{}%", escape_like(substring));
                (
                    format!(
                        "(LOWER(title) = ? OR LOWER(brand) LIKE ? ESCAPE '{e}' OR LOWER(description) LIKE ? ESCAPE '{e}')",
                        e = LIKE_ESCAPE
                    ),
                    vec![exact_title.clone(), pattern.clone(), pattern],
                )
            }
        }
    }
}

fn title_equals(product: &Product, title: &str) -> bool {
    product.title.to_lowercase() == title
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(title: &str, brand: &str, description: &str) -> Product {
        Product {
            id: 1,
            title: title.to_string(),
            brand: brand.to_string(),
            description: description.to_string(),
            price: 10.0,
            image_url: String::new(),
            created_at: Default::default(),
        }
    }

    #[test]
    fn test_empty_term_is_unfiltered() {
        assert_eq!(build_search_predicate(""), SearchPredicate::All);
        assert_eq!(build_search_predicate(" \t\n"), SearchPredicate::All);
        assert!(build_search_predicate("").is_unfiltered());
    }

    #[test]
    fn test_short_terms_match_exactly() {
        assert_eq!(
            build_search_predicate("ab"),
            SearchPredicate::Exact {
                exact_title: "ab".to_string()
            }
        );
        assert_eq!(build_search_predicate(" ABC ").exact_title(), Some("abc"));
        assert_eq!(build_search_predicate("abc").substring(), None);
    }

    #[test]
    fn test_long_terms_match_substrings() {
        let predicate = build_search_predicate("phone");
        assert_eq!(predicate.mode(), "exact_or_substring");
        assert_eq!(predicate.exact_title(), Some("phone"));
        assert_eq!(predicate.substring(), Some("phone"));
        assert_eq!(build_search_predicate("PHONE"), predicate);
    }

    #[test]
    fn test_threshold_counts_characters() {
        // Three characters, five bytes.
        assert_eq!(build_search_predicate("ñña").mode(), "exact");
        assert_eq!(build_search_predicate("abcd").mode(), "exact_or_substring");
    }

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_value(build_search_predicate("")).unwrap(),
            json!({"mode": "all"})
        );
        assert_eq!(
            serde_json::to_value(build_search_predicate("ab")).unwrap(),
            json!({"mode": "exact", "exactTitle": "ab"})
        );
        assert_eq!(
            serde_json::to_value(build_search_predicate("Phone")).unwrap(),
            json!({"mode": "exact_or_substring", "exactTitle": "phone", "substring": "phone"})
        );
    }

    #[test]
    fn test_exact_match_ignores_brand_and_description() {
        let predicate = build_search_predicate("pro");
        assert!(predicate.matches(&product("PRO", "x", "y")));
        assert!(!predicate.matches(&product("Tablet Pro", "Pro", "pro")));
    }

    #[test]
    fn test_substring_match() {
        let predicate = build_search_predicate("abba");
        assert!(predicate.matches(&product("Abba", "x", "y")));
        assert!(predicate.matches(&product("Smartphone", "TechABBA", "y")));
        assert!(predicate.matches(&product("Laptop", "x", "Chip ABBA-X inside")));
        // Titles only match exactly.
        assert!(!predicate.matches(&product("Auriculares ABBA Pro", "x", "y")));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(SearchPredicate::All.matches(&product("", "", "")));
    }

    #[test]
    fn test_sql_rendering() {
        let (sql, values) = SearchPredicate::All.to_sql();
        assert_eq!(sql, "1=1");
        assert!(values.is_empty());

        let (sql, values) = build_search_predicate("ab").to_sql();
        assert_eq!(sql, "LOWER(title) = ?");
        assert_eq!(values, vec!["ab"]);

        let (sql, values) = build_search_predicate("Phone").to_sql();
        assert!(sql.contains("LOWER(brand) LIKE ?"));
        assert!(sql.contains("ESCAPE '\\'"));
        assert_eq!(values, vec!["phone", "%phone%", "%phone%"]);
    }

    #[test]
    fn test_sql_escapes_wildcards() {
        let (_, values) = build_search_predicate("50%_off\\x").to_sql();
        assert_eq!(values[0], "50%_off\\x");
        assert_eq!(values[1], "%50\\%\\_off\\\\x%");
    }
}
