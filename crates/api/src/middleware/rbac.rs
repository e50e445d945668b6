//! Permission-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers whose embedded
//! permission snapshot does not cover the route's requirement. The check is
//! a plain superset test via [`opencall_core::permissions::has_all`];
//! routes with no requirement simply do not use an extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use opencall_core::error::CoreError;
use opencall_core::permissions::{has_all, PERM_ACTIVITY_MANAGE};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `activity:manage` permission. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireActivityManage(user): RequireActivityManage) -> AppResult<Json<()>> {
///     // user is guaranteed to hold activity:manage here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireActivityManage(pub AuthUser);

impl FromRequestParts<AppState> for RequireActivityManage {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !has_all(&user.permissions, &[PERM_ACTIVITY_MANAGE]) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Missing required permission".into(),
            )));
        }
        Ok(RequireActivityManage(user))
    }
}
