//! Repository for roles, permissions, and role membership.

use sqlx::PgPool;

use opencall_core::types::DbId;

/// Provides role-membership and permission-resolution queries.
pub struct RoleRepo;

impl RoleRepo {
    /// Effective permission set of a member: the union of permission codes
    /// across all roles the member belongs to, sorted for stable output.
    pub async fn permissions_for_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT p.code
             FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             JOIN role_members rm ON rm.role_id = rp.role_id
             WHERE rm.member_id = $1
             ORDER BY p.code",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    /// Add a member to a role by role name. Idempotent.
    pub async fn assign_by_name(
        pool: &PgPool,
        member_id: DbId,
        role_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO role_members (role_id, member_id)
             SELECT id, $2 FROM roles WHERE name = $1
             ON CONFLICT (role_id, member_id) DO NOTHING",
        )
        .bind(role_name)
        .bind(member_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
