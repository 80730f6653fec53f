//! Header exclusion sets for forwarded traffic.
//!
//! # Responsibilities
//! - Define, in one place, which request headers never reach the backend
//! - Define which response headers never reach the browser
//! - Produce new header maps instead of mutating the incoming ones
//! - Stamp the diagnostic headers on relayed responses
//!
//! # Design Decisions
//! - Transport headers (host, connection, ...) are re-derived by the client
//! - CORS headers from the backend are dropped; the same-origin gateway
//!   decides its own CORS policy
//! - The target header is for operators only and carries no authority

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Marker header set on every relayed response.
pub const X_HANDLED_BY_PROXY: HeaderName = HeaderName::from_static("x-handled-by-proxy");

/// Header carrying the resolved upstream URL.
pub const X_PROXY_TARGET: HeaderName = HeaderName::from_static("x-proxy-target");

/// Request headers that are transport specific and never forwarded.
pub const EXCLUDED_REQUEST_HEADERS: [HeaderName; 5] = [
    header::HOST,
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::ACCEPT_ENCODING,
    header::CONTENT_LENGTH,
];

/// Response headers the backend may not dictate to the browser.
pub const EXCLUDED_RESPONSE_HEADERS: [HeaderName; 2] = [
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
];

/// Copy every header whose name is not in `excluded`.
///
/// Repeated headers keep all of their values and their order.
pub fn copy_excluding(source: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if !excluded.contains(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Build the header map sent to the backend.
///
/// Transport headers are dropped and `origin` is replaced by the backend origin.
pub fn upstream_request_headers(incoming: &HeaderMap, backend_origin: &str) -> HeaderMap {
    let mut headers = copy_excluding(incoming, &EXCLUDED_REQUEST_HEADERS);
    match HeaderValue::from_str(backend_origin) {
        Ok(value) => {
            headers.insert(header::ORIGIN, value);
        }
        Err(_) => {
            headers.remove(header::ORIGIN);
        }
    }
    headers
}

/// Build the header map returned to the browser.
pub fn downstream_response_headers(upstream: &HeaderMap, target_url: &str) -> HeaderMap {
    let mut headers = copy_excluding(upstream, &EXCLUDED_RESPONSE_HEADERS);
    headers.insert(X_HANDLED_BY_PROXY, HeaderValue::from_static("true"));
    // Non-visible characters in the target only cost us the diagnostic.
    if let Ok(value) = HeaderValue::from_str(target_url) {
        headers.insert(X_PROXY_TARGET, value);
    }
    headers
}
