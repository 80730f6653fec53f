//! Access Control Middleware.
//! Gates protected page sections by role and sub-role.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::access::{AccessGuard, DenyReason, GuardState, IdentityClaim};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Context attached to page requests that passed the guard.
#[derive(Clone, Debug)]
pub struct PageAccess {
    /// Matching protected section, `None` for public pages.
    pub section: Option<String>,
    pub identity: Option<IdentityClaim>,
}

pub async fn access_control_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let identity = state.identity.resolve(req.headers());

    // 1. The unauthorized page itself is never guarded.
    if path == state.unauthorized_path.as_ref() {
        req.extensions_mut().insert(PageAccess { section: None, identity });
        return next.run(req).await;
    }

    // 2. Paths outside every protected section are public.
    let Some(section) = state.sections.section_for(&path) else {
        req.extensions_mut().insert(PageAccess { section: None, identity });
        return next.run(req).await;
    };

    // 3. Fresh guard per request, always starting at Pending.
    let mut guard = AccessGuard::new(&section.policy);
    match guard.resolve(identity.as_ref()) {
        GuardState::Allowed => {
            metrics::record_access_decision(&section.name, "allowed");
            let ctx = PageAccess {
                section: Some(section.name.clone()),
                identity,
            };
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        denied => {
            let reason = match denied {
                GuardState::Denied(reason) => reason,
                _ => DenyReason::Unauthenticated,
            };
            tracing::info!(
                request_id = %request_id(req.headers()),
                path = %path,
                section = %section.name,
                reason = reason.as_str(),
                "Access denied"
            );
            metrics::record_access_decision(&section.name, "denied");
            Redirect::to(&state.unauthorized_path).into_response()
        }
    }
}
