//! CLI command implementations.

pub mod check;
pub mod config;
pub mod predicate;
pub mod price;
pub mod search;
pub mod seed;

use clap::{Args, Subcommand};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Text to check.
    pub text: String,
}

/// Arguments for the price command.
#[derive(Args)]
pub struct PriceArgs {
    /// Original price.
    #[arg(allow_negative_numbers = true)]
    pub price: f64,

    /// Search term the price is quoted for.
    pub term: String,
}

/// Arguments for the predicate command.
#[derive(Args)]
pub struct PredicateArgs {
    /// Search term.
    #[arg(default_value = "")]
    pub term: String,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search term (empty lists every product).
    #[arg(default_value = "")]
    pub term: String,

    /// Show only the first N results.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Write the script to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Omit the CREATE TABLE statement.
    #[arg(long)]
    pub no_schema: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
