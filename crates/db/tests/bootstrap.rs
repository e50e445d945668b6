use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify seed data.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    opencall_db::health_check(&pool).await.unwrap();

    // The admin role must carry the activity:manage permission out of the box.
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM role_permissions rp
         JOIN roles r ON r.id = rp.role_id
         JOIN permissions p ON p.id = rp.permission_id
         WHERE r.name = 'admin' AND p.code = 'activity:manage'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count.0, 1, "admin role should be seeded with activity:manage");
}
