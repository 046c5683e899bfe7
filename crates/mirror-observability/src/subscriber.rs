//! `tracing` subscriber setup.

use mirror_core::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter {filter:?}: {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Settings for the process-wide subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `mirror_commerce=debug,info`.
    pub filter: String,
    pub format: LogFormat,
    /// Colored output for the human format.
    pub ansi: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
            ansi: false,
        }
    }
}

impl From<&LoggingConfig> for LoggingSettings {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            filter: config.level.clone(),
            format: config.format,
            ansi: false,
        }
    }
}

impl LoggingSettings {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// `RUST_LOG` when set, otherwise the configured filter.
    pub fn env_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.filter).map_err(|e| ObservabilityError::InvalidFilter {
            filter: self.filter.clone(),
            message: e.to_string(),
        })
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), ObservabilityError> {
    let filter = settings.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match settings.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init(),
        LogFormat::Human => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(settings.ansi)
                    .with_target(false),
            )
            .try_init(),
    };

    result.map_err(|e| ObservabilityError::Init(e.to_string()))
}
