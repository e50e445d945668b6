pub mod activity;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /activities/slug/{slug}        public lookup (?lang= filter)
/// /activities                    list, create (activity:manage)
/// /activities/{id}               get, patch (activity:manage)
///
/// /auth/github                   redirect to provider (public)
/// /auth/github/callback          OAuth callback (public)
/// /auth/dev-login                dev-only login shortcut (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/activities", activity::router())
        .nest("/auth", auth::router())
}
