//! Product search module.
//!
//! Builds the tiered title/brand/description predicate for a search term and
//! defines the search response returned to API callers.

mod predicate;
mod results;

pub use predicate::{build_search_predicate, SearchPredicate, EXACT_MATCH_MAX_LEN};
pub use results::{SearchMeta, SearchResponse, API_VERSION};
