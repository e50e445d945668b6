//! Handlers for the `/auth` resource (GitHub OAuth login, dev login).
//!
//! The OAuth flow runs in a popup: the callback responds with a small HTML
//! page that messages its opener window and closes itself, while the
//! session JWT travels in an HttpOnly cookie. Every failure on the login
//! path is flattened into a single authentication-failure outcome;
//! already-classified authentication failures pass through unchanged.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use opencall_core::error::CoreError;
use opencall_db::models::member::{CreateMember, Member};
use opencall_db::repositories::{MemberRepo, RoleRepo};

use crate::auth::github::{self, PROVIDER_GITHUB};
use crate::auth::jwt::generate_token;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

/// Name of the short-lived anti-forgery cookie set before the redirect.
const STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the anti-forgery cookie in minutes.
const STATE_COOKIE_MAX_AGE_MINS: i64 = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

/// Request body for `POST /auth/dev-login`.
#[derive(Debug, Deserialize)]
pub struct DevLoginRequest {
    pub email: String,
}

/// Token response returned by dev login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Session token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/github
///
/// Generates an anti-forgery state token, stores it in a short-lived
/// HttpOnly cookie, and redirects to the provider's authorization page.
pub async fn github_redirect(State(state): State<AppState>) -> Response {
    let state_token = Uuid::new_v4().to_string();
    let url = github::authorize_url(&state.config.github, &state_token);

    let state_cookie = Cookie::build((STATE_COOKIE, state_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_COOKIE_MAX_AGE_MINS))
        .build();

    let mut response = Redirect::to(&url).into_response();
    append_cookie(&mut response, &state_cookie);
    response
}

/// GET /api/v1/auth/github/callback?code=&state=
///
/// Validates the state against the cookie, completes the login, and
/// responds with the popup page (success or error variant). The session
/// cookie is set only on success.
pub async fn github_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let origin = state.config.cors_origins.first().cloned().unwrap_or_default();

    // 1. Anti-forgery: the state parameter must match the cookie.
    if cookie_value(&headers, STATE_COOKIE).as_deref() != Some(query.state.as_str()) {
        tracing::warn!("OAuth callback state mismatch");
        return popup_response(
            StatusCode::UNAUTHORIZED,
            &origin,
            &json!({ "type": "oauth", "status": "error", "message": "state mismatch" }),
            None,
        );
    }

    // 2. Complete the login; flatten every failure to an auth failure.
    match complete_login(&state, &query.code).await {
        Ok(token) => {
            let session = session_cookie(&state.config, &token);
            popup_response(
                StatusCode::OK,
                &origin,
                &json!({ "type": "oauth", "status": "success" }),
                Some(&session),
            )
        }
        Err(err) => {
            let err = normalize_auth_failure(err);
            tracing::warn!(error = %err, "GitHub login failed");
            popup_response(
                StatusCode::UNAUTHORIZED,
                &origin,
                &json!({ "type": "oauth", "status": "error", "message": "login failed" }),
                None,
            )
        }
    }
}

/// POST /api/v1/auth/dev-login
///
/// Development-only shortcut bypassing the OAuth exchange: looks up or
/// creates a member by email, computes permissions, and issues a token.
/// Refuses to run outside development mode.
pub async fn dev_login(
    State(state): State<AppState>,
    Json(input): Json<DevLoginRequest>,
) -> AppResult<Response> {
    // 1. Hard gate on the execution mode.
    if !state.config.mode.is_development() {
        return Err(AppError::Core(CoreError::Forbidden(
            "dev-login is only available in development mode".into(),
        )));
    }

    // 2. Look up or create the member.
    let member = match MemberRepo::find_by_email(&state.pool, &input.email).await? {
        Some(member) => member,
        None => {
            let name = input
                .email
                .split('@')
                .next()
                .unwrap_or(&input.email)
                .to_string();
            MemberRepo::create(
                &state.pool,
                &CreateMember {
                    email: input.email.clone(),
                    name,
                    nickname: None,
                    avatar_url: None,
                },
            )
            .await?
        }
    };

    // 3. Issue the token with the member's current permission snapshot.
    let (token, expires_in) = issue_token(&state, &member).await?;

    let session = session_cookie(&state.config, &token);
    let mut response = Json(TokenResponse { token, expires_in }).into_response();
    append_cookie(&mut response, &session);
    Ok(response)
}

// ---------------------------------------------------------------------------
// Login flow
// ---------------------------------------------------------------------------

/// Complete a GitHub login: exchange the code, resolve the member, and
/// issue a session token.
async fn complete_login(state: &AppState, code: &str) -> AppResult<String> {
    // 1. Exchange the authorization code for a provider access token.
    let access_token = github::exchange_code(&state.http, &state.config.github, code).await?;

    // 2. Fetch profile, emails, and social accounts concurrently; the
    //    three calls are independent and order-insensitive.
    let (user, emails, socials) = tokio::try_join!(
        github::fetch_user(&state.http, &access_token),
        github::fetch_emails(&state.http, &access_token),
        github::fetch_social_accounts(&state.http, &access_token),
    )?;

    // 3. Effective email: the public profile email, else the primary one.
    let email = user
        .email
        .clone()
        .or_else(|| {
            emails
                .iter()
                .find(|e| e.primary)
                .map(|e| e.email.clone())
        })
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "GitHub account has no usable email".into(),
            ))
        })?;

    // 4. Upsert the local member and its provider identity.
    let provider_user_id = user.id.to_string();
    let member = match MemberRepo::find_by_email(&state.pool, &email).await? {
        Some(member) => {
            if !MemberRepo::has_provider(&state.pool, member.id, PROVIDER_GITHUB).await? {
                MemberRepo::link_provider(
                    &state.pool,
                    member.id,
                    PROVIDER_GITHUB,
                    &provider_user_id,
                )
                .await?;
            }
            member
        }
        None => {
            let member = MemberRepo::create(
                &state.pool,
                &CreateMember {
                    email: email.clone(),
                    name: user.name.clone().unwrap_or_else(|| user.login.clone()),
                    nickname: Some(user.login.clone()),
                    avatar_url: user.avatar_url.clone(),
                },
            )
            .await?;
            MemberRepo::link_provider(&state.pool, member.id, PROVIDER_GITHUB, &provider_user_id)
                .await?;
            MemberRepo::add_social_link(&state.pool, member.id, PROVIDER_GITHUB, &user.html_url)
                .await?;
            for social in &socials {
                MemberRepo::add_social_link(&state.pool, member.id, &social.provider, &social.url)
                    .await?;
            }
            member
        }
    };

    // 5. Issue the session token with the permission snapshot.
    let (token, _) = issue_token(state, &member).await?;
    Ok(token)
}

/// Compute the member's effective permission set and sign a session token.
async fn issue_token(state: &AppState, member: &Member) -> AppResult<(String, i64)> {
    let permissions = RoleRepo::permissions_for_member(&state.pool, member.id).await?;
    let token = generate_token(member.id, &member.email, permissions, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok((token, state.config.jwt.expiry_mins * 60))
}

/// Collapse any login-path failure into the single authentication-failure
/// category, leaving already-classified authentication failures untouched.
fn normalize_auth_failure(err: AppError) -> AppError {
    match err {
        AppError::Core(CoreError::Unauthorized(_)) => err,
        other => {
            tracing::warn!(error = %other, "login failure normalized to authentication failure");
            AppError::Core(CoreError::Unauthorized("Login failed".into()))
        }
    }
}

// ---------------------------------------------------------------------------
// Cookie / popup helpers
// ---------------------------------------------------------------------------

/// Build the HttpOnly session cookie carrying the JWT.
fn session_cookie(config: &ServerConfig, token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(config.jwt.expiry_mins))
        .build()
}

/// Read a cookie value from request headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    Cookie::split_parse(raw)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Append a `Set-Cookie` header to a response.
fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    response.headers_mut().append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .expect("cookie serializes to a valid header value"),
    );
}

/// Build the popup page response: a small HTML document that messages the
/// opener window and closes itself. The state cookie is always cleared;
/// `session` is set only on success.
fn popup_response(
    status: StatusCode,
    origin: &str,
    message: &serde_json::Value,
    session: Option<&Cookie<'_>>,
) -> Response {
    let page = format!(
        "<!doctype html>\n\
         <html>\n\
         <body>\n\
         <script>\n\
           if (window.opener) {{\n\
             window.opener.postMessage({message}, {origin:?});\n\
           }}\n\
           window.close();\n\
         </script>\n\
         <p>You can close this window now.</p>\n\
         </body>\n\
         </html>\n"
    );

    let clear_state = Cookie::build((STATE_COOKIE, ""))
        .path("/")
        .max_age(CookieDuration::ZERO)
        .build();

    let mut response = (status, Html(page)).into_response();
    append_cookie(&mut response, &clear_state);
    if let Some(session) = session {
        append_cookie(&mut response, session);
    }
    response
}
