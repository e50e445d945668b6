//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the caller from the session cookie or a
//!   Bearer token.
//! - [`rbac::RequireActivityManage`] -- Requires the `activity:manage`
//!   permission.

pub mod auth;
pub mod rbac;
