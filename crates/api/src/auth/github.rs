//! GitHub OAuth2 client.
//!
//! Covers the three legs of the login flow: building the authorization
//! redirect URL, exchanging the callback code for an access token, and
//! fetching the user's profile, emails, and social accounts from the REST
//! API. Provider-side failures surface as [`CoreError::Unauthorized`] so
//! the whole login path collapses into a single authentication-failure
//! category.

use reqwest::Url;
use serde::Deserialize;

use opencall_core::error::CoreError;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE: &str = "https://api.github.com";

/// Provider identifier stored on `member_providers` rows.
pub const PROVIDER_GITHUB: &str = "github";

/// GitHub OAuth application credentials.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GithubConfig {
    /// Load GitHub OAuth configuration from environment variables.
    ///
    /// | Env Var                | Required |
    /// |------------------------|----------|
    /// | `GITHUB_CLIENT_ID`     | **yes**  |
    /// | `GITHUB_CLIENT_SECRET` | **yes**  |
    /// | `GITHUB_REDIRECT_URI`  | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if any variable is missing.
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("GITHUB_CLIENT_ID")
                .expect("GITHUB_CLIENT_ID must be set in the environment"),
            client_secret: std::env::var("GITHUB_CLIENT_SECRET")
                .expect("GITHUB_CLIENT_SECRET must be set in the environment"),
            redirect_uri: std::env::var("GITHUB_REDIRECT_URI")
                .expect("GITHUB_REDIRECT_URI must be set in the environment"),
        }
    }
}

/// The authenticated user's profile (`GET /user`).
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: String,
}

/// One entry from `GET /user/emails`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}

/// One entry from `GET /user/social_accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubSocialAccount {
    pub provider: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

/// Build the authorization redirect URL, requesting the minimal
/// email-reading scope and binding the caller-supplied anti-forgery state.
pub fn authorize_url(config: &GithubConfig, state: &str) -> String {
    let url = Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", "user:email"),
            ("state", state),
        ],
    )
    .expect("authorize URL is valid");
    url.to_string()
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &GithubConfig,
    code: &str,
) -> Result<String, CoreError> {
    let response = http
        .post(TOKEN_URL)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| CoreError::Unauthorized(format!("GitHub token exchange failed: {e}")))?;

    let body: AccessTokenResponse = response
        .json()
        .await
        .map_err(|e| CoreError::Unauthorized(format!("GitHub token response malformed: {e}")))?;

    body.access_token.ok_or_else(|| {
        CoreError::Unauthorized(format!(
            "GitHub rejected the authorization code: {}",
            body.error_description.unwrap_or_else(|| "unknown".into())
        ))
    })
}

/// Fetch the authenticated user's profile.
pub async fn fetch_user(http: &reqwest::Client, token: &str) -> Result<GithubUser, CoreError> {
    get_api(http, token, "/user").await
}

/// Fetch the authenticated user's email addresses.
pub async fn fetch_emails(
    http: &reqwest::Client,
    token: &str,
) -> Result<Vec<GithubEmail>, CoreError> {
    get_api(http, token, "/user/emails").await
}

/// Fetch the authenticated user's linked social accounts.
pub async fn fetch_social_accounts(
    http: &reqwest::Client,
    token: &str,
) -> Result<Vec<GithubSocialAccount>, CoreError> {
    get_api(http, token, "/user/social_accounts").await
}

async fn get_api<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    token: &str,
    path: &str,
) -> Result<T, CoreError> {
    http.get(format!("{API_BASE}{path}"))
        .header("Accept", "application/vnd.github+json")
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| CoreError::Unauthorized(format!("GitHub API call {path} failed: {e}")))?
        .error_for_status()
        .map_err(|e| CoreError::Unauthorized(format!("GitHub API call {path} failed: {e}")))?
        .json()
        .await
        .map_err(|e| CoreError::Unauthorized(format!("GitHub API response {path} malformed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GithubConfig {
        GithubConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000/api/v1/auth/github/callback".to_string(),
        }
    }

    #[test]
    fn authorize_url_carries_all_params() {
        let url = authorize_url(&test_config(), "state-token");
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("scope=user%3Aemail"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000"));
    }
}
