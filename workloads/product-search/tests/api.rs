//! Product API end to end over the seeded in-memory catalog.

use std::sync::Arc;

use mirror_commerce::store::InMemoryStore;
use mirror_core::{AppConfig, Environment, Method, RequestContext, RequestId};
use mirror_security::MemoryBucketStore;
use product_search::{handle, reject_method, ApiResponse, ApiState};
use serde_json::Value;

fn state() -> ApiState {
    state_with(AppConfig::default())
}

fn state_with(mut config: AppConfig) -> ApiState {
    // Keep request logs out of test output.
    config.logging.level = "error".to_string();
    ApiState::in_memory(config).expect("api state")
}

fn get(state: &ApiState, url: &str) -> ApiResponse {
    handle(&RequestContext::new(Method::Get, url), state)
}

fn json(response: &ApiResponse) -> Value {
    serde_json::from_slice(&response.body).expect("json body")
}

#[test]
fn test_palindrome_search() {
    let state = state();
    let response = get(&state, "/api/v1/products/search?q=abba");
    assert_eq!(response.status.as_u16(), 200);

    let body = json(&response);
    assert_eq!(body["isPalindrome"], true);
    assert_eq!(body["discountApplied"], 50);
    assert_eq!(body["totalResults"], 3);
    assert_eq!(body["searchTerm"], "abba");
    assert_eq!(body["meta"]["version"], "v1");
    assert!(body["meta"]["searchTime"].is_u64());

    for product in body["products"].as_array().unwrap() {
        let original = product["originalPrice"].as_f64().unwrap();
        let fin = product["finalPrice"].as_f64().unwrap();
        assert!((fin * 2.0 - original).abs() < 1e-9);
    }
}

#[test]
fn test_search_term_is_url_decoded() {
    let state = state();
    let body = json(&get(&state, "/api/v1/products/search?q=Monitor+4K"));
    assert_eq!(body["searchTerm"], "Monitor 4K");
    assert_eq!(body["totalResults"], 1);
    assert_eq!(body["isPalindrome"], false);
}

#[test]
fn test_missing_query_lists_everything() {
    let state = state();
    let body = json(&get(&state, "/api/v1/products/search"));
    assert_eq!(body["totalResults"], 12);
    assert_eq!(body["searchTerm"], "");
    assert_eq!(body["discountApplied"], 0);
}

#[test]
fn test_unknown_search_parameter_rejected() {
    let state = state();
    let response = get(&state, "/api/v1/products/search?q=abba&page=2");
    assert_eq!(response.status.as_u16(), 400);

    let body = json(&response);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["message"], "property page should not exist");
    assert_eq!(body["path"], "/api/v1/products/search?q=abba&page=2");
}

#[test]
fn test_list_products() {
    let state = state();
    let body = json(&get(&state, "/api/v1/products"));

    assert_eq!(body["meta"]["count"], 12);
    assert_eq!(body["meta"]["version"], "v1");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 12);
    assert_eq!(data[0]["title"], "Cargador Inalámbrico");
    assert!(data[0]["price"].is_f64());
}

#[test]
fn test_product_by_id() {
    let state = state();

    let body = json(&get(&state, "/api/v1/products/9"));
    assert_eq!(body["data"]["title"], "level");
    assert!(body["meta"].get("count").is_none());

    let missing = get(&state, "/api/v1/products/999");
    assert_eq!(missing.status.as_u16(), 404);
    assert_eq!(json(&missing)["error"], "NOT_FOUND");

    let invalid = get(&state, "/api/v1/products/abc");
    assert_eq!(invalid.status.as_u16(), 400);
    assert_eq!(json(&invalid)["error"], "BAD_REQUEST");
}

#[test]
fn test_unknown_path_and_method() {
    let state = state();

    let response = get(&state, "/api/v1/orders");
    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(json(&response)["message"], "Cannot GET /api/v1/orders");

    let response = handle(&RequestContext::new(Method::Delete, "/api/v1/products/1"), &state);
    assert_eq!(response.status.as_u16(), 405);
    assert_eq!(json(&response)["error"], "METHOD_NOT_ALLOWED");
    assert_eq!(response.header("allow"), Some("GET, OPTIONS"));
}

#[test]
fn test_preflight() {
    let state = state();
    let response = handle(
        &RequestContext::new(Method::Options, "/api/v1/products/search"),
        &state,
    );

    assert_eq!(response.status.as_u16(), 204);
    assert!(response.body.is_empty());
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
}

#[test]
fn test_common_headers() {
    let state = state();
    let ctx = RequestContext::new(Method::Get, "/api/v1/products");
    let response = handle(&ctx, &state);

    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(
        response.header("x-request-id"),
        Some(ctx.request_id.to_string().as_str())
    );
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert!(response.header("strict-transport-security").is_none());
}

#[test]
fn test_hsts_in_production() {
    let mut config = AppConfig::default();
    config.environment = Environment::Production;
    let state = state_with(config);

    let response = get(&state, "/api/v1/products");
    assert_eq!(
        response.header("strict-transport-security"),
        Some("max-age=31536000; includeSubDomains")
    );
}

#[test]
fn test_search_throttle_per_client() {
    let mut config = AppConfig::default();
    config.throttle.search_limit = 2;
    let state = state_with(config);

    let search = |client: &str| {
        handle(
            &RequestContext::new(Method::Get, "/api/v1/products/search?q=deed")
                .with_header("x-forwarded-for", client),
            &state,
        )
    };

    assert_eq!(search("203.0.113.1").status.as_u16(), 200);
    assert_eq!(search("203.0.113.1").status.as_u16(), 200);

    let limited = search("203.0.113.1");
    assert_eq!(limited.status.as_u16(), 429);
    assert_eq!(json(&limited)["error"], "RATE_LIMITED");
    assert!(limited.header("retry-after").is_some());

    // Another client and other routes are unaffected.
    assert_eq!(search("203.0.113.2").status.as_u16(), 200);
    let list = handle(
        &RequestContext::new(Method::Get, "/api/v1/products")
            .with_header("x-forwarded-for", "203.0.113.1"),
        &state,
    );
    assert_eq!(list.status.as_u16(), 200);
}

#[test]
fn test_throttle_survives_fresh_state() {
    let mut config = AppConfig::default();
    config.logging.level = "error".to_string();
    config.throttle.search_limit = 2;
    let buckets = Arc::new(MemoryBucketStore::new());

    // Spin builds new state for every request; only the bucket store is shared.
    let search = || {
        let state = ApiState::with_buckets(
            config.clone(),
            Box::new(InMemoryStore::new()),
            Box::new(Arc::clone(&buckets)),
        )
        .expect("api state");
        handle(
            &RequestContext::new(Method::Get, "/api/v1/products/search?q=abba")
                .with_header("spin-client-addr", "198.51.100.9:51234"),
            &state,
        )
    };

    assert_eq!(search().status.as_u16(), 200);
    assert_eq!(search().status.as_u16(), 200);
    let limited = search();
    assert_eq!(limited.status.as_u16(), 429);
    assert_eq!(json(&limited)["error"], "RATE_LIMITED");
}

#[test]
fn test_forwarded_for_cannot_dodge_throttle() {
    let mut config = AppConfig::default();
    config.throttle.search_limit = 1;
    let state = state_with(config);

    let search = |spoofed: &str| {
        handle(
            &RequestContext::new(Method::Get, "/api/v1/products/search?q=deed")
                .with_header("spin-client-addr", "198.51.100.9:51234")
                .with_header("x-forwarded-for", spoofed),
            &state,
        )
    };

    assert_eq!(search("1.1.1.1").status.as_u16(), 200);
    assert_eq!(search("2.2.2.2").status.as_u16(), 429);
}

#[test]
fn test_unmodelled_method_gets_common_headers() {
    let state = state();
    let request_id = RequestId::from_string("req-trace-1");
    let response = reject_method("TRACE", "/api/v1/products", &request_id, &state);

    assert_eq!(response.status.as_u16(), 405);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.header("x-request-id"), Some("req-trace-1"));
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("allow"), Some("GET, OPTIONS"));

    let body = json(&response);
    assert_eq!(body["error"], "METHOD_NOT_ALLOWED");
    assert_eq!(body["message"], "Method TRACE not allowed");
    assert_eq!(body["path"], "/api/v1/products");
}

#[test]
fn test_custom_prefix() {
    let mut config = AppConfig::default();
    config.server.api_prefix = "/shop".to_string();
    let state = state_with(config);

    assert_eq!(get(&state, "/shop/products").status.as_u16(), 200);
    assert_eq!(get(&state, "/api/v1/products").status.as_u16(), 404);
}
