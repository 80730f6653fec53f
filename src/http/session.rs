//! Session-facing handlers: navigation menu, landing redirect and page context.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
    Extension,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::access::{render_menu, IdentityClaim, MenuItem};
use crate::http::middleware::PageAccess;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Browser path used to pick the active entry.
    pub current: Option<String>,
}

/// Navigation for the current identity.
#[derive(Debug, Serialize)]
pub struct MenuView {
    pub identity: Option<IdentityClaim>,
    pub landing_path: Option<String>,
    pub entries: Vec<MenuItem>,
}

/// Data a page shell needs to render.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub path: String,
    pub section: Option<String>,
    pub identity: Option<IdentityClaim>,
    pub landing_path: Option<String>,
    pub menu: Vec<MenuItem>,
}

fn menu_view(state: &AppState, identity: Option<IdentityClaim>, current: &str) -> MenuView {
    let entries = identity
        .as_ref()
        .map(|id| state.menus.for_identity(id))
        .unwrap_or(&[]);
    MenuView {
        landing_path: entries.first().map(|e| e.path.clone()),
        entries: render_menu(entries, current, state.active_match),
        identity,
    }
}

/// `GET /session/menu`
pub async fn menu_handler(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
    headers: HeaderMap,
) -> Json<MenuView> {
    let identity = state.identity.resolve(&headers);
    let current = query.current.unwrap_or_default();
    Json(menu_view(&state, identity, &current))
}

/// `GET /session/landing`
pub async fn landing_handler(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let landing = state
        .identity
        .resolve(&headers)
        .and_then(|id| state.menus.landing_path(&id).map(str::to_string));

    match landing {
        Some(path) => Redirect::to(&path),
        None => Redirect::to(&state.unauthorized_path),
    }
}

/// Fallback page handler, runs behind the access control middleware.
pub async fn page_handler(
    State(state): State<AppState>,
    Extension(access): Extension<PageAccess>,
    uri: Uri,
) -> Response {
    let path = uri.path().to_string();
    let view = menu_view(&state, access.identity, &path);
    Json(PageContext {
        path,
        section: access.section,
        identity: view.identity,
        landing_path: view.landing_path,
        menu: view.entries,
    })
    .into_response()
}

/// `GET /healthz`
pub async fn health_handler() -> &'static str {
    "ok"
}
