//! Forwarding error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::json_error;

/// Why a request could not be relayed.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The backend URL is missing or invalid; no request was attempted.
    #[error("proxy target is not configured: set a valid absolute backend URL")]
    NotConfigured,

    /// The request body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The request body could not be read from the client.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The target URL is not a valid request URI.
    #[error("invalid target url '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The backend could not be reached.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] crate::forwarder::upstream::UpstreamError),

    /// The backend did not answer in time.
    #[error("upstream did not respond within {secs}s")]
    UpstreamTimeout { secs: u64 },
}

impl ForwardError {
    /// Stable machine-readable code, also used as the metrics label.
    pub fn code(&self) -> &'static str {
        match self {
            ForwardError::NotConfigured => "proxy_not_configured",
            ForwardError::BodyTooLarge { .. } => "body_too_large",
            ForwardError::BodyRead(_) => "body_read",
            ForwardError::InvalidTarget { .. } => "invalid_target",
            ForwardError::Upstream(_) => "upstream_unreachable",
            ForwardError::UpstreamTimeout { .. } => "upstream_timeout",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ForwardError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ForwardError::BodyRead(_) | ForwardError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ForwardError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        json_error(self.status(), self.code(), &self.to_string())
    }
}
