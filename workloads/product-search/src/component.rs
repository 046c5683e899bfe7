//! Spin HTTP entry point.
//!
//! Each request runs in a fresh component instance, so throttle buckets are
//! read from and written back to the `[throttle] store` key-value store.

use spin_sdk::http::{Method as SpinMethod, Request, Response};
use spin_sdk::http_component;

use mirror_commerce::store::SqlProductStore;
use mirror_core::{AppConfig, Method, RequestContext, RequestId};
use mirror_observability::{init_tracing, LoggingSettings};
use mirror_security::KvBucketStore;

use crate::response::ApiResponse;
use crate::router;
use crate::state::ApiState;

/// Product search API handler.
#[http_component]
fn handle_product_search(req: Request) -> anyhow::Result<Response> {
    let mut config = AppConfig::default();
    config.apply_env()?;
    // A subscriber may already be installed in a reused instance.
    let _ = init_tracing(&LoggingSettings::from(&config.logging));

    let products = SqlProductStore::open(&config.database.name)?;
    let buckets = KvBucketStore::open(&config.throttle.store)?;
    let state = ApiState::with_buckets(config, Box::new(products), Box::new(buckets))?;

    let path_with_query = req.path_and_query().unwrap_or("/").to_string();
    let request_id = req
        .header("x-request-id")
        .and_then(|value| value.as_str())
        .map(RequestId::from_string)
        .unwrap_or_else(RequestId::generate);

    let Some(method) = convert_method(req.method()) else {
        let name = method_name(req.method());
        let response = router::reject_method(name, &path_with_query, &request_id, &state);
        return Ok(into_spin(response));
    };

    let mut ctx = RequestContext::new(method, path_with_query).with_request_id(request_id);
    for (name, value) in req.headers() {
        if let Some(value) = value.as_str() {
            ctx = ctx.with_header(name, value);
        }
    }

    Ok(into_spin(router::handle(&ctx, &state)))
}

fn convert_method(method: &SpinMethod) -> Option<Method> {
    match method {
        SpinMethod::Get => Some(Method::Get),
        SpinMethod::Post => Some(Method::Post),
        SpinMethod::Put => Some(Method::Put),
        SpinMethod::Delete => Some(Method::Delete),
        SpinMethod::Patch => Some(Method::Patch),
        SpinMethod::Head => Some(Method::Head),
        SpinMethod::Options => Some(Method::Options),
        _ => None,
    }
}

fn method_name(method: &SpinMethod) -> &str {
    match method {
        SpinMethod::Connect => "CONNECT",
        SpinMethod::Trace => "TRACE",
        SpinMethod::Other(name) => name,
        _ => "UNKNOWN",
    }
}

fn into_spin(response: ApiResponse) -> Response {
    let mut builder = Response::builder();
    builder.status(response.status.as_u16());
    for (name, value) in response.headers {
        builder.header(name, value);
    }
    builder.body(response.body).build()
}
