//! Palindrome check command.

use anyhow::Result;
use mirror_commerce::palindrome;
use serde::Serialize;

use super::CheckArgs;
use crate::context::Context;
use crate::output::verdict_badge;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    text: &'a str,
    #[serde(flatten)]
    verdict: palindrome::PalindromeVerdict,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let verdict = palindrome::check(&args.text);

    if ctx.output.is_json() {
        ctx.output.json(&CheckReport {
            text: &args.text,
            verdict,
        });
        return Ok(());
    }

    ctx.output.kv("text", &args.text);
    ctx.output.kv("normalized", &verdict.normalized);
    ctx.output.kv("verdict", &verdict_badge(verdict.is_palindrome));
    Ok(())
}
