//! Request routing.
//!
//! `handle` is a pure function of the request context and the shared state,
//! so the whole API can be exercised natively without a Spin host.

use http::StatusCode;

use mirror_commerce::search::SearchMeta;
use mirror_commerce::CommerceError;
use mirror_core::{Method, RequestContext, RequestId};
use mirror_observability::{LogLevel, StructuredLogger};
use mirror_security::{header_names, LimitsError, ThrottleScope};

use crate::response::{ApiResponse, DataEnvelope, ErrorCode, ResponseMeta};
use crate::state::ApiState;

/// Service name used in log lines.
pub const SERVICE_NAME: &str = "product-search";

/// Query parameters accepted by the search route.
const SEARCH_PARAMS: [&str; 1] = ["q"];

/// API routes, relative to the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /products/search?q=`
    Search,
    /// `GET /products`
    List,
    /// `GET /products/{id}`, id not yet validated.
    ById(String),
}

impl Route {
    pub fn parse(path: &str, prefix: &str) -> Option<Self> {
        let prefix = prefix.trim_end_matches('/');
        let rest = path.strip_prefix(prefix)?.trim_end_matches('/');
        let mut segments = rest.strip_prefix('/')?.split('/');

        if segments.next()? != "products" {
            return None;
        }
        let route = match segments.next() {
            None => Route::List,
            Some("search") => Route::Search,
            Some(id) if !id.is_empty() => Route::ById(id.to_string()),
            Some(_) => return None,
        };
        match segments.next() {
            None => Some(route),
            Some(_) => None,
        }
    }

    fn scope(&self) -> ThrottleScope {
        match self {
            Route::Search => ThrottleScope::Search,
            Route::List | Route::ById(_) => ThrottleScope::Global,
        }
    }
}

/// Handle one API request.
pub fn handle(ctx: &RequestContext, state: &ApiState) -> ApiResponse {
    let logger = StructuredLogger::for_request(ctx, SERVICE_NAME, &state.config.logging);
    logger
        .entry(LogLevel::Debug, "request started")
        .field("client", ctx.client_ip())
        .emit();

    let response = dispatch(ctx, state, &logger);

    let level = if response.status.is_server_error() {
        LogLevel::Error
    } else if response.status.is_client_error() {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };
    logger
        .entry(level, "request completed")
        .field_u64("status", u64::from(response.status.as_u16()))
        .duration_ms("duration_ms", ctx.timing.elapsed())
        .emit();

    finish(response, &ctx.request_id, state)
}

/// Answer a request whose method has no [`Method`] counterpart, such as
/// `TRACE` or `CONNECT`.
pub fn reject_method(
    method: &str,
    url: &str,
    request_id: &RequestId,
    state: &ApiState,
) -> ApiResponse {
    tracing::warn!(method, url, request_id = %request_id, "unsupported method");
    finish(method_not_allowed(method, url), request_id, state)
}

fn method_not_allowed(method: &str, url: &str) -> ApiResponse {
    ApiResponse::error(
        ErrorCode::MethodNotAllowed,
        format!("Method {method} not allowed"),
        url,
    )
    .with_header("allow", "GET, OPTIONS")
}

fn dispatch(ctx: &RequestContext, state: &ApiState, logger: &StructuredLogger) -> ApiResponse {
    if ctx.method == Method::Options {
        return ApiResponse::empty(StatusCode::NO_CONTENT);
    }

    let Some(route) = Route::parse(&ctx.path, &state.config.server.api_prefix) else {
        return ApiResponse::error(
            ErrorCode::NotFound,
            format!("Cannot {} {}", ctx.method, ctx.path),
            &ctx.url,
        );
    };

    if ctx.method != Method::Get {
        return method_not_allowed(ctx.method.as_str(), &ctx.url);
    }

    if let Err(e) = state.throttle.check(ctx.client_ip(), route.scope()) {
        return throttled(e, ctx);
    }

    match route {
        Route::Search => search(ctx, state, logger),
        Route::List => list(ctx, state, logger),
        Route::ById(id) => by_id(&id, ctx, state, logger),
    }
}

fn search(ctx: &RequestContext, state: &ApiState, logger: &StructuredLogger) -> ApiResponse {
    let mut unknown: Vec<&str> = ctx
        .query
        .keys()
        .map(String::as_str)
        .filter(|key| !SEARCH_PARAMS.contains(key))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        let message = unknown
            .iter()
            .map(|key| format!("property {key} should not exist"))
            .collect::<Vec<_>>()
            .join("; ");
        return ApiResponse::error(ErrorCode::BadRequest, message, &ctx.url);
    }

    let term = ctx.query_param("q").unwrap_or("");
    match state.service.search_products(term) {
        Ok(results) => {
            let elapsed = ctx.timing.elapsed_ms();
            logger
                .entry(LogLevel::Info, "search completed")
                .field("term", term)
                .field_u64("results", results.total_results as u64)
                .field_bool("is_palindrome", results.is_palindrome)
                .field_u64("search_time_ms", elapsed)
                .emit();
            let results = results.with_meta(SearchMeta::new(elapsed, chrono::Utc::now()));
            ApiResponse::json(StatusCode::OK, &results)
        }
        Err(e) => {
            logger
                .entry(LogLevel::Error, "search failed")
                .field("term", term)
                .field("error", e.to_string())
                .emit();
            ApiResponse::error(ErrorCode::SearchError, "Failed to search products", &ctx.url)
        }
    }
}

fn list(ctx: &RequestContext, state: &ApiState, logger: &StructuredLogger) -> ApiResponse {
    match state.service.find_all() {
        Ok(products) => {
            let meta = ResponseMeta::now().with_count(products.len());
            ApiResponse::json(StatusCode::OK, &DataEnvelope { data: products, meta })
        }
        Err(e) => {
            logger
                .entry(LogLevel::Error, "listing products failed")
                .field("error", e.to_string())
                .emit();
            ApiResponse::error(ErrorCode::FetchError, "Failed to fetch products", &ctx.url)
        }
    }
}

fn by_id(
    raw_id: &str,
    ctx: &RequestContext,
    state: &ApiState,
    logger: &StructuredLogger,
) -> ApiResponse {
    let Ok(id) = raw_id.parse::<i64>() else {
        return ApiResponse::error(
            ErrorCode::BadRequest,
            "Validation failed (numeric string is expected)",
            &ctx.url,
        );
    };

    match state.service.find_one(id) {
        Ok(product) => ApiResponse::json(
            StatusCode::OK,
            &DataEnvelope {
                data: product,
                meta: ResponseMeta::now(),
            },
        ),
        Err(CommerceError::ProductNotFound(_)) => {
            ApiResponse::error(ErrorCode::NotFound, "Product not found", &ctx.url)
        }
        Err(e) => {
            logger
                .entry(LogLevel::Error, "fetching product failed")
                .field("id", raw_id)
                .field("error", e.to_string())
                .emit();
            ApiResponse::error(ErrorCode::FetchError, "Failed to fetch product", &ctx.url)
        }
    }
}

fn throttled(error: LimitsError, ctx: &RequestContext) -> ApiResponse {
    let retry_after = match &error {
        LimitsError::RateLimitExceeded {
            retry_after_secs, ..
        } => *retry_after_secs,
        LimitsError::InvalidLimit(_) | LimitsError::Store(_) => 1,
    };
    ApiResponse::error(ErrorCode::RateLimited, error.to_string(), &ctx.url)
        .with_header(header_names::RETRY_AFTER, retry_after.to_string())
}

/// Attach headers every response carries.
fn finish(mut response: ApiResponse, request_id: &RequestId, state: &ApiState) -> ApiResponse {
    let mut headers = vec![
        ("content-type".to_string(), "application/json".to_string()),
        (
            header_names::X_REQUEST_ID.to_string(),
            request_id.to_string(),
        ),
    ];
    headers.extend(state.headers.to_headers());
    headers.append(&mut response.headers);
    response.headers = headers;
    response
}
