//! Typed client for server-side calls to the backend API.
//!
//! The bearer token is an explicit argument of every call. Nothing is cached
//! between calls, so concurrent renders for different sessions cannot see each
//! other's credentials.

use std::fmt;
use std::time::Duration;

use reqwest::{redirect::Policy, Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::forwarder::{trailing_segments, BackendTarget};

/// Access token of a signed-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend URL is not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    target: BackendTarget,
}

impl ApiClient {
    /// Build a client for `target`. Redirects are not followed.
    pub fn new(target: BackendTarget, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client, target })
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// Prepare a request for `path` (relative to the backend base path).
    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&BearerToken>,
    ) -> Result<RequestBuilder, ApiError> {
        if !self.target.is_configured() {
            return Err(ApiError::NotConfigured);
        }

        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let url = self.target.build_url(&trailing_segments(path), query);

        let builder = self.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Send a prepared request and return status and body text.
    pub async fn fetch(
        &self,
        method: Method,
        path: &str,
        token: Option<&BearerToken>,
    ) -> Result<(StatusCode, String), ApiError> {
        let response = self.request(method, path, token)?.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// `GET` a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, token)?.send().await?;
        Self::decode(response).await
    }

    /// Send a JSON body and decode the JSON reply.
    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path, token)?.json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}
