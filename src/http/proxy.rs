//! Forwarding handlers for `/proxy`, `/_/api` and `/_api`.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    response::{IntoResponse, Response},
};

use crate::forwarder::headers::X_PROXY_TARGET;
use crate::forwarder::{trailing_segments, ForwardError};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Path prefixes that map onto the forwarder.
pub const PROXY_MOUNTS: [&str; 3] = ["/proxy", "/_/api", "/_api"];

/// Relay any method under a proxy mount to the backend.
pub async fn proxy_handler(
    State(state): State<AppState>,
    matched: MatchedPath,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let prefix = mount_prefix(matched.as_str());
    let segments = trailing_segments(path.strip_prefix(prefix).unwrap_or(""));

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match state.forwarder.forward(request, &segments).await {
        Ok(response) => {
            let status = response.status();
            let target = response
                .headers()
                .get(X_PROXY_TARGET)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                target = %target,
                status = status.as_u16(),
                "Upstream responded"
            );
            metrics::record_request(method.as_str(), status.as_u16(), start_time);
            response
        }
        Err(e) => {
            match &e {
                ForwardError::NotConfigured
                | ForwardError::Upstream(_)
                | ForwardError::UpstreamTimeout { .. } => {
                    tracing::error!(request_id = %request_id, path = %path, error = %e, "Forwarding failed");
                }
                _ => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %e, "Request rejected");
                }
            }
            metrics::record_forward_error(e.code());
            metrics::record_request(method.as_str(), e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}

/// Literal prefix of a matched route pattern such as `/proxy/{*path}` or `/proxy/`.
fn mount_prefix(pattern: &str) -> &str {
    pattern.trim_end_matches("{*path}").trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_prefix() {
        assert_eq!(mount_prefix("/proxy/{*path}"), "/proxy");
        assert_eq!(mount_prefix("/_/api/{*path}"), "/_/api");
        assert_eq!(mount_prefix("/proxy"), "/proxy");
        assert_eq!(mount_prefix("/_api/"), "/_api");
    }

    #[test]
    fn test_segments_keep_encoding() {
        let path = "/_api/users/a%20b";
        let segments = trailing_segments(path.strip_prefix(mount_prefix("/_api/{*path}")).unwrap());
        assert_eq!(segments, vec!["users", "a%20b"]);
    }

    #[test]
    fn test_bare_mount_has_no_segments() {
        let rest = "/proxy/".strip_prefix(mount_prefix("/proxy/")).unwrap();
        assert!(trailing_segments(rest).is_empty());
    }
}
