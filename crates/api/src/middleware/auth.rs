//! Session-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use cookie::Cookie;

use opencall_core::error::CoreError;
use opencall_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "token";

/// Authenticated member resolved once per request from the session cookie
/// or, failing that, an `Authorization: Bearer` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(member_id = user.member_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The member's internal database id (from `claims.sub`).
    pub member_id: DbId,
    /// The member's email at login time.
    pub email: String,
    /// Permission snapshot embedded in the token.
    pub permissions: Vec<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_cookie_token(parts)
            .or_else(|| bearer_token(parts))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing session token".into()))
            })?;

        let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            member_id: claims.sub,
            email: claims.email,
            permissions: claims.permissions,
        })
    }
}

/// Pull the session token out of the `Cookie` header, if present.
fn session_cookie_token(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    Cookie::split_parse(raw)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// Pull a Bearer token out of the `Authorization` header, if present.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}
