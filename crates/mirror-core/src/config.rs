//! Application configuration.
//!
//! Configuration comes from a TOML (or JSON) file and is then overridden by
//! environment variables, so a deployment can tweak single values without
//! shipping a file. Every section has defaults; an empty file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("configuration validation error: {0}")]
    Invalid(String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            "test" => Some(Environment::Test),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "human" | "pretty" => Some(LogFormat::Human),
            _ => None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Prefix for every API route.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_prefix: default_api_prefix(),
        }
    }
}

/// Product database settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite database label ("default" is the component's default database).
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Insert the demo catalog when the products table is empty.
    #[serde(default = "default_true")]
    pub seed_on_start: bool,
}

fn default_db_name() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            seed_on_start: true,
        }
    }
}

/// Request throttling. Limits are requests per client per `ttl_secs` window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrottleConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Limit applied to every route.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Stricter limit applied to the search route.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Spin key-value store holding the buckets of every component instance.
    #[serde(default = "default_throttle_store")]
    pub store: String,
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_limit() -> u32 {
    100
}

fn default_search_limit() -> u32 {
    30
}

fn default_throttle_store() -> String {
    "default".to_string()
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            limit: default_limit(),
            search_limit: default_search_limit(),
            store: default_throttle_store(),
        }
    }
}

/// CORS and security header settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfig {
    /// Origin allowed to call the API from a browser.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,

    /// `max-age` of the HSTS header, sent only in production.
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age_secs: u64,
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    ["Content-Type", "Authorization", "X-Request-ID"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_hsts_max_age() -> u64 {
    31_536_000
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origin: default_cors_origin(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            hsts_max_age_secs: default_hsts_max_age(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Json,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        if display.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        } else {
            Self::from_toml(&content).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: display,
                    message,
                },
                other => other,
            })
        }
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(std::env::vars())
    }

    /// Apply overrides from an explicit set of variables.
    pub fn apply_env_from<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "MIRROR_ENV" => {
                    self.environment =
                        Environment::parse(&value).ok_or_else(|| invalid_env(&key, &value))?;
                }
                "DB_NAME" => self.database.name = value,
                "THROTTLE_TTL" => self.throttle.ttl_secs = parse_env(&key, &value)?,
                "THROTTLE_LIMIT" => self.throttle.limit = parse_env(&key, &value)?,
                "THROTTLE_SEARCH_LIMIT" => self.throttle.search_limit = parse_env(&key, &value)?,
                "THROTTLE_STORE" => self.throttle.store = value,
                "FRONTEND_URL" => self.security.cors_origin = value,
                "LOG_LEVEL" => self.logging.level = value.to_ascii_lowercase(),
                "LOG_FORMAT" => {
                    self.logging.format =
                        LogFormat::parse(&value).ok_or_else(|| invalid_env(&key, &value))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.server.api_prefix.starts_with('/') {
            errors.push("server.api_prefix: must start with '/'".to_string());
        }
        if self.database.name.trim().is_empty() {
            errors.push("database.name: must not be empty".to_string());
        }
        if self.throttle.ttl_secs == 0 {
            errors.push("throttle.ttl_secs: must be greater than 0".to_string());
        }
        if self.throttle.limit == 0 {
            errors.push("throttle.limit: must be greater than 0".to_string());
        }
        if self.throttle.search_limit == 0 {
            errors.push("throttle.search_limit: must be greater than 0".to_string());
        }
        if self.throttle.store.trim().is_empty() {
            errors.push("throttle.store: must not be empty".to_string());
        }
        if self.security.cors_origin.trim().is_empty() {
            errors.push("security.cors_origin: must not be empty".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(format!(
                "logging.level: must be one of {}",
                LOG_LEVELS.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid_env(key, value))
}

fn invalid_env(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Generate a commented default `mirror.toml`.
pub fn generate_default_config() -> String {
    r#"# MirrorShop configuration
environment = "development"

[server]
api_prefix = "/api/v1"

[database]
name = "default"
seed_on_start = true

[throttle]
# Requests per client per window
ttl_secs = 60
limit = 100
search_limit = 30
# Key-value store shared by all instances
store = "default"

[security]
cors_origin = "http://localhost:3000"
allowed_methods = ["GET", "POST", "PUT", "DELETE"]
allowed_headers = ["Content-Type", "Authorization", "X-Request-ID"]
hsts_max_age_secs = 31536000

[logging]
level = "info"
format = "json"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.throttle.limit, 100);
        assert_eq!(config.throttle.search_limit, 30);
        assert_eq!(config.security.cors_origin, "http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = AppConfig::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
environment = "production"

[throttle]
search_limit = 5
"#,
        )
        .unwrap();
        assert!(config.environment.is_production());
        assert_eq!(config.throttle.search_limit, 5);
        assert_eq!(config.throttle.limit, 100);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.logging.format = LogFormat::Human;
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_from(vars(&[
                ("THROTTLE_SEARCH_LIMIT", "10"),
                ("THROTTLE_STORE", "throttle"),
                ("FRONTEND_URL", "https://shop.example.com"),
                ("LOG_FORMAT", "pretty"),
                ("MIRROR_ENV", "prod"),
                ("UNRELATED", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.throttle.search_limit, 10);
        assert_eq!(config.throttle.store, "throttle");
        assert_eq!(config.security.cors_origin, "https://shop.example.com");
        assert_eq!(config.logging.format, LogFormat::Human);
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_bad_env_value_names_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_from(vars(&[("THROTTLE_TTL", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("THROTTLE_TTL"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.api_prefix = "api".to_string();
        config.throttle.limit = 0;
        config.logging.level = "loud".to_string();

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("server.api_prefix"));
        assert!(message.contains("throttle.limit"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/mirror.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
