//! Outbound HTTP client used by the forwarder.
//!
//! The forwarder talks to the backend through the [`Upstream`] trait so the
//! relay algorithm can be exercised without a network.

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

/// Transport-level failure while contacting the backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UpstreamError(pub String);

/// Sends a fully built request to the backend.
///
/// Implementations must not follow redirects and must not retry.
pub trait Upstream: Send + Sync + std::fmt::Debug {
    fn send(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>>;
}

/// Hyper-based upstream client.
///
/// The legacy client never follows redirects, so 3xx responses reach the
/// browser untouched.
#[derive(Debug, Clone)]
pub struct HyperUpstream {
    client: Client<HttpConnector, Body>,
}

impl HyperUpstream {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HyperUpstream {
    fn default() -> Self {
        Self::new()
    }
}

impl Upstream for HyperUpstream {
    fn send(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
        Box::pin(async move {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| UpstreamError(e.to_string()))?;
            let (parts, body) = response.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}
