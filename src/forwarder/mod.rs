//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! /proxy/{*path}, /_/api/{*path}, /_api/{*path}
//!     → target.rs (origin + base path + segments + query)
//!     → headers.rs (drop transport headers, set origin)
//!     → body buffered unless GET/HEAD
//!     → upstream.rs (single attempt, redirects not followed)
//!     → headers.rs (drop backend CORS headers, add diagnostics)
//!     → response body streamed back unchanged
//! ```
//!
//! # Design Decisions
//! - Stateless, at-most-once relay: no retries, no backoff, no circuit breaking
//! - The target descriptor is resolved once and read-only afterwards
//! - An unconfigured target fails before any network activity
//! - The upstream call is bounded by its own timeout so a slow backend is
//!   reported as a gateway failure, not a client timeout

pub mod error;
pub mod headers;
pub mod target;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use futures_util::StreamExt;
use axum::http::{header, Method, Request, Response, Uri};

pub use error::ForwardError;
pub use target::{trailing_segments, BackendTarget};
pub use upstream::{HyperUpstream, Upstream, UpstreamError};

use crate::forwarder::headers::{downstream_response_headers, upstream_request_headers};

/// Same-origin relay to the configured backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    target: BackendTarget,
    upstream: Arc<dyn Upstream>,
    max_body_size: usize,
    upstream_timeout: Duration,
}

impl Forwarder {
    pub fn new(
        target: BackendTarget,
        upstream: Arc<dyn Upstream>,
        max_body_size: usize,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            target,
            upstream,
            max_body_size,
            upstream_timeout,
        }
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// Relay `request` to the backend path made of `segments`.
    pub async fn forward(
        &self,
        request: Request<Body>,
        segments: &[String],
    ) -> Result<Response<Body>, ForwardError> {
        if !self.target.is_configured() {
            return Err(ForwardError::NotConfigured);
        }

        let (parts, body) = request.into_parts();
        let target_url = self
            .target
            .build_url(segments, parts.uri.query().unwrap_or(""));
        let uri: Uri = target_url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidTarget {
                url: target_url.clone(),
                reason: e.to_string(),
            })?;

        let body = if carries_body(&parts.method) {
            if declared_length(&parts.headers).is_some_and(|len| len > self.max_body_size) {
                return Err(ForwardError::BodyTooLarge {
                    limit: self.max_body_size,
                });
            }
            Body::from(read_limited(body, self.max_body_size).await?)
        } else {
            Body::empty()
        };

        let mut outgoing = Request::new(body);
        *outgoing.method_mut() = parts.method;
        *outgoing.uri_mut() = uri;
        *outgoing.headers_mut() = upstream_request_headers(&parts.headers, self.target.origin());

        let response = tokio::time::timeout(self.upstream_timeout, self.upstream.send(outgoing))
            .await
            .map_err(|_| ForwardError::UpstreamTimeout {
                secs: self.upstream_timeout.as_secs(),
            })??;

        let (mut parts, body) = response.into_parts();
        parts.headers = downstream_response_headers(&parts.headers, &target_url);
        Ok(Response::from_parts(parts, body))
    }
}

/// GET and HEAD never forward a body.
fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Buffer a request body, failing as soon as it grows past `limit`.
///
/// Covers chunked uploads and bodies longer than their declared length.
async fn read_limited(body: Body, limit: usize) -> Result<Vec<u8>, ForwardError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ForwardError::BodyRead(e.to_string()))?;
        if buf.len() + chunk.len() > limit {
            return Err(ForwardError::BodyTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn declared_length(headers: &axum::http::HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
