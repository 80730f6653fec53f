//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, access control)
//! - Build the forwarder, identity resolver, sections and menus once
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::access::{HeaderIdentityResolver, IdentityResolver, MenuTable, SectionPolicies};
use crate::config::{ActiveMatch, GatewayConfig};
use crate::forwarder::{BackendTarget, Forwarder, HyperUpstream, Upstream};
use crate::http::middleware::access_control_middleware;
use crate::http::proxy::{proxy_handler, PROXY_MOUNTS};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::session::{health_handler, landing_handler, menu_handler, page_handler};

/// Application state injected into handlers.
///
/// Everything here is read-only after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub identity: Arc<dyn IdentityResolver>,
    pub sections: Arc<SectionPolicies>,
    pub menus: Arc<MenuTable>,
    pub active_match: ActiveMatch,
    pub unauthorized_path: Arc<str>,
}

impl AppState {
    /// Build state from configuration with the given upstream client.
    pub fn from_config(config: &GatewayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let target = BackendTarget::resolve(&config.backend.url);
        if target.is_configured() {
            tracing::info!(
                origin = %target.origin(),
                base_path = %target.base_path(),
                "Backend target resolved"
            );
            if target.origin().starts_with("https://") {
                tracing::warn!(
                    origin = %target.origin(),
                    "Upstream connector speaks plain HTTP; terminate TLS in front of the backend"
                );
            }
        } else {
            tracing::error!(
                url = %config.backend.url,
                "Backend URL missing or invalid, forwarding disabled"
            );
        }

        Self {
            forwarder: Arc::new(Forwarder::new(
                target,
                upstream,
                config.security.max_body_size,
                Duration::from_secs(config.timeouts.request_secs),
            )),
            identity: Arc::new(HeaderIdentityResolver::new(
                config.access.role_header.clone(),
                config.access.sub_role_header.clone(),
            )),
            sections: Arc::new(SectionPolicies::from_config(&config.access.sections)),
            menus: Arc::new(MenuTable::from_config(&config.menu)),
            active_match: config.menu.active_match,
            unauthorized_path: Arc::from(config.access.unauthorized_path.as_str()),
        }
    }
}

/// HTTP server for the portal gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server forwarding through hyper.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_upstream(config, Arc::new(HyperUpstream::new()))
    }

    /// Create a server with a custom upstream client.
    pub fn with_upstream(config: GatewayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let state = AppState::from_config(&config, upstream);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Proxy routes are added after the timeout layer; the forwarder bounds
    /// the upstream call itself and answers with a JSON gateway error.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let timeout = Duration::from_secs(config.timeouts.request_secs);

        let pages = Router::new()
            .fallback(page_handler)
            .layer(middleware::from_fn_with_state(state.clone(), access_control_middleware))
            .layer(TimeoutLayer::new(timeout))
            .with_state(state.clone());

        let mut router = Router::new()
            .route("/healthz", get(health_handler))
            .route("/session/menu", get(menu_handler))
            .route("/session/landing", get(landing_handler))
            .layer(TimeoutLayer::new(timeout));

        for mount in PROXY_MOUNTS {
            router = router
                .route(mount, any(proxy_handler))
                .route(&format!("{}/", mount), any(proxy_handler))
                .route(&format!("{}/{{*path}}", mount), any(proxy_handler));
        }

        router
            .with_state(state)
            .fallback_service(pages)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionConfig;
    use crate::forwarder::UpstreamError;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use futures_util::future::BoxFuture;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct EchoUpstream;

    #[derive(Debug)]
    struct StalledUpstream;

    impl Upstream for StalledUpstream {
        fn send(&self, _request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Response::new(Body::empty()))
            })
        }
    }

    impl Upstream for EchoUpstream {
        fn send(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, UpstreamError>> {
            let uri = request.uri().to_string();
            Box::pin(async move { Ok(Response::new(Body::from(uri))) })
        }
    }

    fn server() -> HttpServer {
        let mut config = GatewayConfig::default();
        config.backend.url = "http://api.internal/v2".into();
        config.access.sections.push(SectionConfig {
            name: "clinic".into(),
            path_prefix: "/clinic".into(),
            allowed_roles: vec!["clinic".into()],
            allowed_sub_roles: vec![],
        });
        HttpServer::with_upstream(config, Arc::new(EchoUpstream))
    }

    #[tokio::test]
    async fn test_proxy_mount_reaches_upstream() {
        let response = server()
            .router()
            .oneshot(Request::get("/proxy/clinics/3?open=1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"http://api.internal/v2/clinics/3?open=1");
    }

    #[tokio::test]
    async fn test_guarded_page_redirects_without_identity() {
        let response = server()
            .router()
            .oneshot(Request::get("/clinic/doctors").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/unauthorized");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = server()
            .router()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bare_mounts_reach_upstream() {
        for uri in ["/proxy/", "/_api/", "/_/api/", "/proxy"] {
            let response = server()
                .router()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert_eq!(response.headers()["x-handled-by-proxy"], "true", "{}", uri);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], b"http://api.internal/v2/", "{}", uri);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_upstream_is_gateway_timeout() {
        let mut config = GatewayConfig::default();
        config.backend.url = "http://api.internal".into();
        config.timeouts.request_secs = 1;
        let router = HttpServer::with_upstream(config, Arc::new(StalledUpstream)).router();

        let response = router
            .oneshot(Request::get("/proxy/reports").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], "upstream_timeout");
    }
}
