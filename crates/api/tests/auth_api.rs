//! HTTP-level integration tests for the auth endpoints.
//!
//! Tests cover the dev-login shortcut (including its execution-mode gate
//! and the role/permission union), the OAuth redirect leg, callback state
//! validation, and session-cookie authentication.

mod common;

use axum::http::{header, StatusCode};
use common::{
    body_json, body_text, build_test_app, build_test_app_with_mode, get, get_with_cookie,
    post_json,
};
use sqlx::PgPool;

use opencall_api::config::AppMode;
use opencall_db::repositories::{MemberRepo, RoleRepo};

// ---------------------------------------------------------------------------
// Dev login
// ---------------------------------------------------------------------------

/// Dev login creates a member on first use and returns a session token
/// plus an HttpOnly cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_dev_login_creates_member(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "staff@example.com" });
    let response = post_json(app, "/api/v1/auth/dev-login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie must be set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert!(json["expires_in"].is_number());

    let member = MemberRepo::find_by_email(&pool, "staff@example.com")
        .await
        .unwrap()
        .expect("member should have been created");
    assert_eq!(member.name, "staff");
}

/// Dev login is refused outside development mode.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_dev_login_refused_in_production(pool: PgPool) {
    let app = build_test_app_with_mode(pool, AppMode::Production);
    let body = serde_json::json!({ "email": "staff@example.com" });
    let response = post_json(app, "/api/v1/auth/dev-login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A fresh member has no roles, so its token carries no permissions and
/// admin routes reject it. After joining the seeded admin role, a new
/// token carries activity:manage and the same route accepts it.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_dev_login_permission_snapshot(pool: PgPool) {
    // 1. Login without any role: 403 on the admin list.
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "staff@example.com" });
    let response = post_json(app, "/api/v1/auth/dev-login", body.clone()).await;
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let app = build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/v1/activities", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 2. Join the admin role and login again: the new snapshot passes.
    let member = MemberRepo::find_by_email(&pool, "staff@example.com")
        .await
        .unwrap()
        .unwrap();
    RoleRepo::assign_by_name(&pool, member.id, "admin").await.unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/dev-login", body).await;
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let app = build_test_app(pool);
    let response = common::get_auth(app, "/api/v1/activities", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// The session cookie works as an authentication carrier, not just the
/// Authorization header.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_session_cookie_authenticates(pool: PgPool) {
    let token = common::test_token(1, &["activity:manage"]);

    let app = build_test_app(pool);
    let response = get_with_cookie(app, "/api/v1/activities", &format!("token={token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// OAuth redirect / callback
// ---------------------------------------------------------------------------

/// The redirect leg points at GitHub with our client id and sets the
/// anti-forgery state cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_github_redirect(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/auth/github").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("redirect must carry a Location header")
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://github.com/login/oauth/authorize"));
    assert!(location.contains("client_id=test-client-id"));
    assert!(location.contains("state="));

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("state cookie must be set")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("oauth_state="));
    assert!(set_cookie.contains("HttpOnly"));
}

/// A callback whose state does not match the cookie is rejected with the
/// popup error page and no session cookie.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_github_callback_state_mismatch(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_with_cookie(
        app,
        "/api/v1/auth/github/callback?code=abc&state=forged",
        "oauth_state=genuine",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The error page still messages the opener; no session cookie appears.
    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().all(|c| !c.starts_with("token=")));

    let page = body_text(response).await;
    assert!(page.contains("postMessage"));
    assert!(page.contains("error"));
}

/// A callback with no state cookie at all is likewise rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_github_callback_missing_cookie(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/auth/github/callback?code=abc&state=anything").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
