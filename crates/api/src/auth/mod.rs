//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 session-token generation and validation.
//! - [`github`] -- GitHub OAuth2 client (authorize URL, code exchange,
//!   profile/email/social-account fetches).

pub mod github;
pub mod jwt;
