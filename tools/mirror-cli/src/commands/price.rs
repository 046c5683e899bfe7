//! Discount pricing command.

use anyhow::Result;
use mirror_commerce::calculate_discounted_price;

use super::PriceArgs;
use crate::context::Context;
use crate::output::{format_price, verdict_badge};

/// Run the price command.
pub async fn run(args: PriceArgs, ctx: &Context) -> Result<()> {
    if !args.price.is_finite() || args.price < 0.0 {
        ctx.output
            .warn(&format!("Price {} is not a valid catalog price", args.price));
    }

    let result = calculate_discounted_price(args.price, &args.term);

    if ctx.output.is_json() {
        ctx.output.json(&result);
        return Ok(());
    }

    ctx.output.kv("term", &verdict_badge(result.is_palindrome));
    ctx.output.kv("original", &format_price(result.original_price));
    ctx.output
        .kv("discount", &format!("{}%", result.discount_percentage));
    ctx.output
        .kv("discount amount", &format_price(result.discount_amount));
    ctx.output.kv("final", &format_price(result.final_price));
    Ok(())
}
