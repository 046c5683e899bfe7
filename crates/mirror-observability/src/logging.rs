//! Per-request structured logging.
//!
//! Each API request gets a [`StructuredLogger`] that stamps every line with
//! the request ID, method and route, so the lines for one search can be
//! pulled out of the component's stderr.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use mirror_core::{LogFormat, LoggingConfig, RequestContext, RequestId};
use serde::Serialize;

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// One log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub request_id: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Microseconds since the logger was created.
    pub elapsed_us: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    pub fn to_human(&self) -> String {
        let mut line = format!(
            "{} {:5} [{}] {}",
            self.timestamp, self.level, self.request_id, self.message
        );

        if let (Some(method), Some(route)) = (&self.method, &self.route) {
            line.push_str(&format!(" {method} {route}"));
        }
        line.push_str(&format!(" ({}us)", self.elapsed_us));

        if !self.fields.is_empty() {
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            line.push_str(" | ");
            line.push_str(&fields.join(" "));
        }

        line
    }
}

/// Where rendered lines go.
#[derive(Debug, Clone, Default)]
pub enum LogSink {
    /// Standard error (Spin captures it).
    #[default]
    Stderr,
    /// Kept in memory.
    Capture(Arc<Mutex<Vec<String>>>),
}

impl LogSink {
    /// A capturing sink and a handle to its lines.
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (Self::Capture(Arc::clone(&lines)), lines)
    }

    fn write(&self, line: String) {
        match self {
            Self::Stderr => eprintln!("{line}"),
            Self::Capture(lines) => lines.lock().unwrap_or_else(|e| e.into_inner()).push(line),
        }
    }
}

/// Structured logger bound to one request.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    request_id: RequestId,
    service: String,
    method: Option<String>,
    route: Option<String>,
    start_time: Instant,
    min_level: LogLevel,
    format: LogFormat,
    sink: LogSink,
}

impl StructuredLogger {
    pub fn new(request_id: RequestId, service: impl Into<String>) -> Self {
        Self {
            request_id,
            service: service.into(),
            method: None,
            route: None,
            start_time: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink: LogSink::Stderr,
        }
    }

    /// Logger for an incoming request, configured from `[logging]`.
    ///
    /// An unknown level falls back to `info`.
    pub fn for_request(ctx: &RequestContext, service: &str, config: &LoggingConfig) -> Self {
        Self::new(ctx.request_id.clone(), service)
            .with_method(ctx.method.as_str())
            .with_route(ctx.path.clone())
            .with_min_level(LogLevel::parse(&config.level).unwrap_or(LogLevel::Info))
            .with_format(config.format)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    /// Start a log line with typed fields.
    pub fn entry(&self, level: LogLevel, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder {
            logger: self,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.to_string(),
            request_id: self.request_id.to_string(),
            service: self.service.clone(),
            method: self.method.clone(),
            route: self.route.clone(),
            elapsed_us: self.elapsed_us(),
            fields,
        };

        let line = match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        };
        self.sink.write(line);
    }
}

/// Fluent builder for a log line with fields.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl LogBuilder<'_> {
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::Value::String(value.into()));
        self
    }

    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Add a duration field in whole milliseconds.
    pub fn duration_ms(mut self, key: &str, duration: std::time::Duration) -> Self {
        self.fields
            .insert(key.to_string(), (duration.as_millis() as u64).into());
        self
    }

    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::Method;

    fn captured(logger: StructuredLogger) -> (StructuredLogger, Arc<Mutex<Vec<String>>>) {
        let (sink, lines) = LogSink::capture();
        (logger.with_sink(sink), lines)
    }

    #[test]
    fn test_json_line_carries_request_context() {
        let ctx = RequestContext::new(Method::Get, "/api/v1/products/search?q=abba");
        let (logger, lines) = captured(StructuredLogger::for_request(
            &ctx,
            "product-search",
            &LoggingConfig::default(),
        ));

        logger
            .entry(LogLevel::Info, "search completed")
            .field("term", "abba")
            .field_u64("results", 3)
            .field_bool("is_palindrome", true)
            .emit();

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        let json: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(json["level"], "info");
        assert_eq!(json["request_id"], ctx.request_id.to_string());
        assert_eq!(json["service"], "product-search");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["route"], "/api/v1/products/search");
        assert_eq!(json["term"], "abba");
        assert_eq!(json["results"], 3);
        assert_eq!(json["is_palindrome"], true);
    }

    #[test]
    fn test_min_level_filters() {
        let (logger, lines) = captured(
            StructuredLogger::new(RequestId::from_string("r1"), "test")
                .with_min_level(LogLevel::Warn),
        );

        logger.debug("hidden");
        logger.info("hidden");
        logger.warn("shown");
        logger.error("shown");

        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_human_format() {
        let (logger, lines) = captured(
            StructuredLogger::new(RequestId::from_string("r2"), "test")
                .with_method("GET")
                .with_route("/api/v1/products")
                .with_format(LogFormat::Human),
        );

        logger
            .entry(LogLevel::Info, "listed products")
            .field_u64("count", 12)
            .emit();

        let lines = lines.lock().unwrap();
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("[r2] listed products GET /api/v1/products"));
        assert!(lines[0].ends_with("| count=12"));
    }

    #[test]
    fn test_unknown_config_level_defaults_to_info() {
        let ctx = RequestContext::new(Method::Get, "/");
        let mut config = LoggingConfig::default();
        config.level = "chatty".to_string();
        let (logger, lines) = captured(StructuredLogger::for_request(&ctx, "test", &config));

        logger.debug("hidden");
        logger.info("shown");
        assert_eq!(lines.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
