//! Request context with typed parameters.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::lifecycle::TimingContext;

/// Peer address the Spin runtime sets on every request (`ip:port`).
pub const CLIENT_ADDR_HEADER: &str = "spin-client-addr";

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID from the clock and a process-wide counter.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string (e.g. an incoming `x-request-id`).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// HTTP headers, keyed by lowercase name.
pub type Headers = HashMap<String, String>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Parse a method name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "PATCH" => Some(Method::Patch),
            "HEAD" => Some(Method::Head),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed request context passed to handlers.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Original path including the query string, as received.
    pub url: String,
    pub query: QueryParams,
    pub headers: Headers,
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a context from a method and a path that may carry a query string.
    pub fn new(method: Method, path_with_query: impl Into<String>) -> Self {
        let url = path_with_query.into();
        let (path, query) = match url.split_once('?') {
            Some((path, qs)) => (path.to_string(), parse_query_string(qs)),
            None => (url.clone(), HashMap::new()),
        };

        Self {
            request_id: RequestId::generate(),
            method,
            path,
            url,
            query,
            headers: HashMap::new(),
            timing: TimingContext::new(),
        }
    }

    /// Attach a header. Names are stored lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Reuse an upstream request ID instead of the generated one.
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Client address used for throttling.
    ///
    /// The runtime's peer address wins. Behind a proxy, the last
    /// `x-forwarded-for` hop is the one the proxy itself appended; earlier
    /// hops come from the caller and are ignored. Then `x-real-ip`,
    /// otherwise `"unknown"`.
    pub fn client_ip(&self) -> &str {
        self.header(CLIENT_ADDR_HEADER)
            .map(|addr| strip_port(addr.trim()))
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.header("x-forwarded-for")
                    .and_then(|v| v.rsplit(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            })
            .or_else(|| self.header("x-real-ip"))
            .unwrap_or("unknown")
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// `203.0.113.7:443` -> `203.0.113.7`, `[::1]:443` -> `::1`. Bare IPv6
/// addresses are returned unchanged.
fn strip_port(addr: &str) -> &str {
    if let Some(bracketed) = addr.strip_prefix('[') {
        return bracketed.split_once(']').map_or(addr, |(host, _)| host);
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            host
        }
        _ => addr,
    }
}

/// Parse an `application/x-www-form-urlencoded` query string.
///
/// `+` decodes to a space; malformed escapes are kept verbatim. Keys without
/// `=` map to an empty value. Later duplicates win.
pub fn parse_query_string(qs: &str) -> QueryParams {
    qs.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
