//! CORS and security response headers.

use mirror_core::{Environment, SecurityConfig};

/// Header names set on API responses.
pub mod header_names {
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "access-control-allow-origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "access-control-allow-methods";
    pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "access-control-allow-headers";
    pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    pub const VARY: &str = "vary";
    pub const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
    pub const X_FRAME_OPTIONS: &str = "x-frame-options";
    pub const REFERRER_POLICY: &str = "referrer-policy";
    pub const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
    /// Request ID for tracing.
    pub const X_REQUEST_ID: &str = "x-request-id";
    /// Seconds until a throttled client may retry.
    pub const RETRY_AFTER: &str = "retry-after";
}

/// Response headers for browser callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    pub allow_origin: String,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    /// `max-age` for `strict-transport-security`; no header when `None`.
    pub hsts_max_age_secs: Option<u64>,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::from_config(&SecurityConfig::default(), Environment::Development)
    }
}

impl SecurityHeaders {
    /// Headers for `config`. HSTS is only sent in production.
    pub fn from_config(config: &SecurityConfig, environment: Environment) -> Self {
        Self {
            allow_origin: config.cors_origin.clone(),
            allow_methods: config.allowed_methods.clone(),
            allow_headers: config.allowed_headers.clone(),
            allow_credentials: true,
            hsts_max_age_secs: environment
                .is_production()
                .then_some(config.hsts_max_age_secs),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    pub fn with_hsts(mut self, max_age_secs: Option<u64>) -> Self {
        self.hsts_max_age_secs = max_age_secs;
        self
    }

    /// CORS headers only.
    pub fn cors_headers(&self) -> Vec<(String, String)> {
        use header_names::*;

        let mut headers = vec![
            (ACCESS_CONTROL_ALLOW_ORIGIN.to_string(), self.allow_origin.clone()),
            (
                ACCESS_CONTROL_ALLOW_METHODS.to_string(),
                self.allow_methods.join(", "),
            ),
            (
                ACCESS_CONTROL_ALLOW_HEADERS.to_string(),
                self.allow_headers.join(", "),
            ),
        ];
        if self.allow_credentials {
            headers.push((
                ACCESS_CONTROL_ALLOW_CREDENTIALS.to_string(),
                "true".to_string(),
            ));
        }
        if self.allow_origin != "*" {
            headers.push((VARY.to_string(), "Origin".to_string()));
        }
        headers
    }

    /// CORS plus hardening headers.
    pub fn to_headers(&self) -> Vec<(String, String)> {
        use header_names::*;

        let mut headers = self.cors_headers();
        headers.push((X_CONTENT_TYPE_OPTIONS.to_string(), "nosniff".to_string()));
        headers.push((X_FRAME_OPTIONS.to_string(), "SAMEORIGIN".to_string()));
        headers.push((REFERRER_POLICY.to_string(), "no-referrer".to_string()));

        if let Some(max_age) = self.hsts_max_age_secs {
            headers.push((
                STRICT_TRANSPORT_SECURITY.to_string(),
                format!("max-age={max_age}; includeSubDomains"),
            ));
        }
        headers
    }
}
