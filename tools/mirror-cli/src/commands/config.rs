//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use mirror_core::generate_default_config;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "defaults"),
    }
    println!();
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("mirror.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut warnings: Vec<String> = Vec::new();
    if ctx.config.security.cors_origin == "*" {
        warnings.push("security.cors_origin '*' allows any site to call the API".to_string());
    }
    if ctx.config.throttle.search_limit > ctx.config.throttle.limit {
        warnings.push(format!(
            "throttle.search_limit ({}) exceeds throttle.limit ({}) and never applies",
            ctx.config.throttle.search_limit, ctx.config.throttle.limit
        ));
    }
    if ctx.config.environment.is_production() && ctx.config.database.seed_on_start {
        warnings.push("database.seed_on_start inserts demo products in production".to_string());
    }

    if let Err(e) = ctx.config.validate() {
        let problems: Vec<&str> = match &e {
            mirror_core::ConfigError::Invalid(message) => message.split("; ").collect(),
            _ => Vec::new(),
        };
        for problem in &problems {
            ctx.output.error(&format!("Error: {}", problem));
        }
        for warning in &warnings {
            ctx.output.warn(&format!("Warning: {}", warning));
        }
        if problems.is_empty() {
            return Err(e.into());
        }
        bail!("Configuration has {} error(s)", problems.len());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }
    Ok(())
}
