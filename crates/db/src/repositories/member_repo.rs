//! Repository for the `members` table and its linked identity rows.

use sqlx::PgPool;

use opencall_core::types::DbId;

use crate::models::member::{CreateMember, Member};

const COLUMNS: &str = "id, email, name, nickname, avatar_url, created_at, updated_at";

/// Provides lookup and provisioning operations for members.
pub struct MemberRepo;

impl MemberRepo {
    /// Find a member by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE email = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new member, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMember) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (email, name, nickname, avatar_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.nickname)
            .bind(&input.avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Whether the member already has a linked identity for `provider`.
    pub async fn has_provider(
        pool: &PgPool,
        member_id: DbId,
        provider: &str,
    ) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM member_providers
             WHERE member_id = $1 AND provider = $2)",
        )
        .bind(member_id)
        .bind(provider)
        .fetch_one(pool)
        .await?;
        Ok(exists.0)
    }

    /// Link an external-provider identity to a member. Idempotent: an
    /// existing `(member_id, provider)` link is left untouched.
    pub async fn link_provider(
        pool: &PgPool,
        member_id: DbId,
        provider: &str,
        provider_user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO member_providers (member_id, provider, provider_user_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (member_id, provider) DO NOTHING",
        )
        .bind(member_id)
        .bind(provider)
        .bind(provider_user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Attach a social link to a member.
    pub async fn add_social_link(
        pool: &PgPool,
        member_id: DbId,
        provider: &str,
        url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO member_social_links (member_id, provider, url)
             VALUES ($1, $2, $3)",
        )
        .bind(member_id)
        .bind(provider)
        .bind(url)
        .execute(pool)
        .await?;
        Ok(())
    }
}
