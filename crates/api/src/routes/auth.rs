//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`. All three are public; dev-login additionally
/// gates itself on the execution mode.
///
/// ```text
/// GET  /github           -> github_redirect
/// GET  /github/callback  -> github_callback
/// POST /dev-login        -> dev_login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/github", get(auth::github_redirect))
        .route("/github/callback", get(auth::github_callback))
        .route("/dev-login", post(auth::dev_login))
}
