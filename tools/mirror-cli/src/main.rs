//! Mirror CLI - Command line tool for MirrorShop.
//!
//! Commands:
//! - `mirror check` - Check whether text is a palindrome
//! - `mirror price` - Price a product for a search term
//! - `mirror predicate` - Show the search predicate for a term
//! - `mirror search` - Search the demo catalog
//! - `mirror seed` - Emit the SQL that seeds the demo catalog
//! - `mirror config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CheckArgs, ConfigArgs, PredicateArgs, PriceArgs, SearchArgs, SeedArgs};
use mirror_core::LogFormat;
use mirror_observability::{init_tracing, LoggingSettings};

/// Mirror CLI - Palindrome discounts and product search
#[derive(Parser)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether text is a palindrome
    Check(CheckArgs),

    /// Price a product for a search term
    Price(PriceArgs),

    /// Show the search predicate for a term
    Predicate(PredicateArgs),

    /// Search the demo catalog
    Search(SearchArgs),

    /// Print SQL that creates and seeds the products table
    Seed(SeedArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = LoggingSettings {
        format: LogFormat::Human,
        ..LoggingSettings::default()
    }
    .with_filter(if cli.verbose { "debug" } else { "warn" })
    .with_ansi(console::colors_enabled_stderr());
    // Ignored: only fails when a subscriber is already installed.
    let _ = init_tracing(&settings);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args, &ctx).await,
        Commands::Price(args) => commands::price::run(args, &ctx).await,
        Commands::Predicate(args) => commands::predicate::run(args, &ctx).await,
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
