//! Seed script command.

use std::fs;

use anyhow::{Context as _, Result};
use chrono::{Duration, Utc};
use mirror_commerce::catalog::demo_catalog;
use mirror_commerce::store::schema::{render_insert, CREATE_PRODUCTS_TABLE};

use super::SeedArgs;
use crate::context::{resolve_path, Context};

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let script = seed_script(!args.no_schema);

    match args.output {
        Some(path) => {
            let path = resolve_path(&ctx.cwd, &path);
            fs::write(&path, &script)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ctx.output.success(&format!(
                "Wrote {} products to {}",
                demo_catalog().len(),
                path.display()
            ));
        }
        None => print!("{}", script),
    }
    Ok(())
}

/// SQL that (optionally) creates the products table and inserts the demo
/// catalog. Later products get later timestamps, so the last one listed is
/// the newest.
pub fn seed_script(with_schema: bool) -> String {
    let start = Utc::now();
    let mut script = String::new();

    if with_schema {
        script.push_str(CREATE_PRODUCTS_TABLE);
        script.push_str(";\n");
    }
    for (i, product) in demo_catalog().iter().enumerate() {
        let created_at = start + Duration::seconds(i as i64);
        script.push_str(&render_insert(product, created_at));
        script.push('\n');
    }
    script
}
