use crate::auth::github::GithubConfig;
use crate::auth::jwt::JwtConfig;

/// Execution mode, gating development-only surfaces such as dev-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Development,
    Production,
}

impl AppMode {
    pub fn is_development(self) -> bool {
        self == AppMode::Development
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Execution mode (default: development).
    pub mode: AppMode,
    /// JWT session token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// GitHub OAuth application credentials.
    pub github: GithubConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `APP_MODE`             | `development`              |
    ///
    /// JWT and GitHub settings are documented on [`JwtConfig::from_env`]
    /// and [`GithubConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed values or missing required secrets, which is the
    /// desired behaviour -- we want misconfiguration to fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let mode = match std::env::var("APP_MODE")
            .unwrap_or_else(|_| "development".into())
            .as_str()
        {
            "development" => AppMode::Development,
            "production" => AppMode::Production,
            other => panic!("APP_MODE must be 'development' or 'production', got '{other}'"),
        };

        let jwt = JwtConfig::from_env();
        let github = GithubConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            mode,
            jwt,
            github,
        }
    }
}
