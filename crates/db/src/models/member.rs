//! Member and identity-provider entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use opencall_core::types::{DbId, Timestamp};

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new member from a provider profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub email: String,
    pub name: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

/// A linked external-provider identity (`member_providers` row).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberProvider {
    pub id: DbId,
    pub member_id: DbId,
    pub provider: String,
    pub provider_user_id: String,
    pub created_at: Timestamp,
}

/// A social link attached to a member (`member_social_links` row).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberSocialLink {
    pub id: DbId,
    pub member_id: DbId,
    pub provider: String,
    pub url: String,
}
