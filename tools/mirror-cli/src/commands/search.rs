//! Catalog search command.
//!
//! Runs against a freshly seeded in-memory catalog, the same one the API
//! serves when no database is configured.

use anyhow::{Context as _, Result};
use mirror_commerce::prelude::*;

use super::SearchArgs;
use crate::context::Context;
use crate::output::{format_price, verdict_badge};

const WIDTHS: [usize; 5] = [4, 24, 14, 10, 10];

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let store = InMemoryStore::seeded().context("Failed to seed demo catalog")?;
    let service = ProductService::new(store);

    let mut response = service
        .search_products(&args.term)
        .with_context(|| format!("Search for {:?} failed", args.term))?;
    if let Some(limit) = args.limit {
        response.products.truncate(limit);
    }

    if ctx.output.is_json() {
        ctx.output.json(&response);
        return Ok(());
    }

    ctx.output.header(&format!("Results for {:?}", response.search_term));
    ctx.output.kv("term", &verdict_badge(response.is_palindrome));
    ctx.output
        .kv("discount", &format!("{}%", response.discount_applied));
    ctx.output
        .kv("matches", &response.total_results.to_string());

    if response.products.is_empty() {
        ctx.output.info("No products matched.");
        return Ok(());
    }

    println!();
    ctx.output
        .table_row(&["ID", "TITLE", "BRAND", "PRICE", "FINAL"], &WIDTHS);
    for product in &response.products {
        let id = product.id.to_string();
        let original = format_price(product.original_price);
        let fin = format_price(product.final_price);
        ctx.output.table_row(
            &[&id, &product.title, &product.brand, &original, &fin],
            &WIDTHS,
        );
    }
    Ok(())
}
