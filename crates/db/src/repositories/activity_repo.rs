//! Repository for the `activities` and `activity_contents` tables.

use sqlx::PgPool;

use opencall_core::types::DbId;

use crate::models::activity::{
    Activity, ActivityContent, ContentInput, CreateActivity, UpdateActivity,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, start_at, end_at, closed_at, supported_languages, created_at, updated_at";

const CONTENT_COLUMNS: &str = "id, activity_id, lang, title, description, created_at, updated_at";

/// Provides CRUD operations for activities and their per-language contents.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity and its content rows in one transaction.
    ///
    /// The caller is responsible for validation; the `uq_activities_slug`
    /// constraint is the concurrency backstop for slug collisions.
    pub async fn create(
        pool: &PgPool,
        input: &CreateActivity,
    ) -> Result<(Activity, Vec<ActivityContent>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO activities
                (name, slug, start_at, end_at, closed_at, supported_languages)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let activity = sqlx::query_as::<_, Activity>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(input.closed_at)
            .bind(&input.supported_languages)
            .fetch_one(&mut *tx)
            .await?;

        let mut contents = Vec::with_capacity(input.contents.len());
        for content in &input.contents {
            let row = Self::upsert_content(&mut tx, activity.id, content).await?;
            contents.push(row);
        }

        tx.commit().await?;
        Ok((activity, contents))
    }

    /// List all activities ordered by most recently created first, without
    /// content detail.
    pub async fn list(pool: &PgPool) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities ORDER BY created_at DESC");
        sqlx::query_as::<_, Activity>(&query).fetch_all(pool).await
    }

    /// Find an activity by id together with all of its contents, regardless
    /// of language.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(Activity, Vec<ActivityContent>)>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        let Some(activity) = sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let contents = Self::contents_for(pool, activity.id, None).await?;
        Ok(Some((activity, contents)))
    }

    /// Find an activity by slug together with its contents.
    ///
    /// When `lang` is given, contents are filtered to that language in SQL
    /// (case-insensitive). Consistency with `supported_languages` is the
    /// caller's concern.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
        lang: Option<&str>,
    ) -> Result<Option<(Activity, Vec<ActivityContent>)>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE slug = $1");
        let Some(activity) = sqlx::query_as::<_, Activity>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let contents = Self::contents_for(pool, activity.id, lang).await?;
        Ok(Some((activity, contents)))
    }

    /// Whether any activity already uses the given slug.
    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM activities WHERE slug = $1)")
                .bind(slug)
                .fetch_one(pool)
                .await?;
        Ok(exists.0)
    }

    /// Whether an activity other than `id` already uses the given slug.
    pub async fn slug_taken_by_other(
        pool: &PgPool,
        slug: &str,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM activities WHERE slug = $1 AND id <> $2)")
                .bind(slug)
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists.0)
    }

    /// Apply a partial update to an activity and upsert any supplied
    /// contents, all within one transaction.
    ///
    /// Absent fields keep their stored value; `closed_at` is cleared only
    /// when `input.closed_at` is `Some(None)`. Each content is upserted
    /// keyed on `(activity_id, lang)`. Returns the refreshed activity with
    /// all of its contents, or `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateActivity,
    ) -> Result<Option<(Activity, Vec<ActivityContent>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE activities SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                start_at = COALESCE($4, start_at),
                end_at = COALESCE($5, end_at),
                closed_at = CASE WHEN $6 THEN $7 ELSE closed_at END,
                supported_languages = COALESCE($8, supported_languages),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(activity) = sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(input.closed_at.is_some())
            .bind(input.closed_at.flatten())
            .bind(&input.supported_languages)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(contents) = &input.contents {
            for content in contents {
                Self::upsert_content(&mut tx, activity.id, content).await?;
            }
        }

        // Re-read inside the transaction so the returned view matches what
        // the commit will publish.
        let query = format!(
            "SELECT {CONTENT_COLUMNS} FROM activity_contents
             WHERE activity_id = $1 ORDER BY lang"
        );
        let contents = sqlx::query_as::<_, ActivityContent>(&query)
            .bind(activity.id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((activity, contents)))
    }

    /// Insert or update one content row keyed on `(activity_id, lang)`.
    async fn upsert_content(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        activity_id: DbId,
        content: &ContentInput,
    ) -> Result<ActivityContent, sqlx::Error> {
        let query = format!(
            "INSERT INTO activity_contents (activity_id, lang, title, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (activity_id, lang) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                updated_at = NOW()
             RETURNING {CONTENT_COLUMNS}"
        );
        sqlx::query_as::<_, ActivityContent>(&query)
            .bind(activity_id)
            .bind(&content.lang)
            .bind(&content.title)
            .bind(&content.description)
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the contents of an activity, optionally filtered to one
    /// language (case-insensitive), ordered by language code.
    async fn contents_for(
        pool: &PgPool,
        activity_id: DbId,
        lang: Option<&str>,
    ) -> Result<Vec<ActivityContent>, sqlx::Error> {
        let query = format!(
            "SELECT {CONTENT_COLUMNS} FROM activity_contents
             WHERE activity_id = $1 AND ($2::text IS NULL OR lang = LOWER($2))
             ORDER BY lang"
        );
        sqlx::query_as::<_, ActivityContent>(&query)
            .bind(activity_id)
            .bind(lang)
            .fetch_all(pool)
            .await
    }
}
