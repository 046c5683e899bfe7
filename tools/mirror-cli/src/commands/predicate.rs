//! Search predicate inspection command.

use anyhow::Result;
use mirror_commerce::build_search_predicate;
use serde_json::json;

use super::PredicateArgs;
use crate::context::Context;

/// Run the predicate command.
pub async fn run(args: PredicateArgs, ctx: &Context) -> Result<()> {
    let predicate = build_search_predicate(&args.term);
    let (clause, params) = predicate.to_sql();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "predicate": predicate,
            "sql": { "where": clause, "params": params },
        }));
        return Ok(());
    }

    ctx.output.kv("mode", predicate.mode());
    if let Some(title) = predicate.exact_title() {
        ctx.output.kv("exact title", title);
    }
    if let Some(substring) = predicate.substring() {
        ctx.output.kv("substring", substring);
    }
    ctx.output.kv("where", &clause);
    if !params.is_empty() {
        ctx.output.kv("params", &params.join(", "));
    }
    Ok(())
}
