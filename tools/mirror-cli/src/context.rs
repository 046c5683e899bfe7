//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use mirror_core::AppConfig;

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["mirror.toml", ".mirror.toml", "mirror.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Loaded configuration, environment overrides applied.
    pub config: AppConfig,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file, or the nearest one found
    /// walking up from the working directory.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve_path(&cwd, path)),
            None => find_config(&cwd),
        };

        let mut config = match &config_path {
            Some(path) => {
                output.debug(&format!("Using config {}", path.display()));
                AppConfig::load(path)?
            }
            None => {
                output.debug("No config file found, using defaults");
                AppConfig::default()
            }
        };
        config
            .apply_env()
            .context("Invalid environment override")?;

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }
}

/// Find the nearest config file in `start` or its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Resolve a path relative to the working directory.
pub fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
