//! Route definitions for the `/activities` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Routes mounted at `/activities`.
///
/// ```text
/// GET   /slug/{slug}  -> get_by_slug (public)
/// GET   /             -> list        (activity:manage)
/// POST  /             -> create      (activity:manage)
/// GET   /{id}         -> get_by_id   (activity:manage)
/// PATCH /{id}         -> update      (activity:manage)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slug/{slug}", get(activity::get_by_slug))
        .route("/", get(activity::list).post(activity::create))
        .route("/{id}", get(activity::get_by_id).patch(activity::update))
}
