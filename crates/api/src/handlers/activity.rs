//! Handlers for the `/activities` resource.
//!
//! Admin endpoints require `activity:manage`; the slug lookup is public.
//! All cross-field validation runs before any write, so a failed request
//! leaves the store untouched.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use opencall_core::activity as rules;
use opencall_core::error::CoreError;
use opencall_core::types::{DbId, Timestamp};
use opencall_db::models::activity::{
    Activity, ActivityWithContents, ContentInput, CreateActivity, UpdateActivity,
};
use opencall_db::repositories::ActivityRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireActivityManage;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string for the public slug lookup.
#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    pub lang: Option<String>,
}

/// Public projection of an activity: slug, schedule fields, supported
/// languages, and contents. Internal ids and audit timestamps stay private.
#[derive(Debug, Serialize)]
pub struct PublicActivity {
    pub slug: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub supported_languages: Vec<String>,
    pub contents: Vec<PublicContent>,
}

/// Public projection of one content row.
#[derive(Debug, Serialize)]
pub struct PublicContent {
    pub lang: String,
    pub title: String,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/activities
///
/// Create an activity with its initial per-language contents. All checks
/// pass before any write: date ordering, slug shape and uniqueness,
/// language-set consistency.
pub async fn create(
    State(state): State<AppState>,
    RequireActivityManage(_user): RequireActivityManage,
    Json(mut input): Json<CreateActivity>,
) -> AppResult<(StatusCode, Json<ActivityWithContents>)> {
    // 1. Normalize: slug and language codes are stored lowercase.
    input.slug = input.slug.trim().to_lowercase();
    normalize_languages(&mut input.supported_languages, &mut input.contents);

    // 2. Field-level checks.
    rules::validate_slug(&input.slug)?;
    rules::validate_supported_languages(&input.supported_languages)?;
    for content in &input.contents {
        rules::validate_content_fields(&content.lang, &content.title)?;
    }
    if input.contents.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "contents must not be empty".into(),
        )));
    }

    // 3. Date ordering.
    rules::validate_schedule(input.start_at, input.end_at, input.closed_at)?;

    // 4. Slug uniqueness.
    if ActivityRepo::slug_exists(&state.pool, &input.slug).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "slug '{}' is already taken",
            input.slug
        ))));
    }

    // 5. Every content language must be supported, with no duplicates.
    let langs: Vec<String> = input.contents.iter().map(|c| c.lang.clone()).collect();
    rules::validate_content_languages(&langs, &input.supported_languages)?;

    // 6. Insert activity + contents in one transaction.
    let (activity, contents) = ActivityRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActivityWithContents { activity, contents }),
    ))
}

/// GET /api/v1/activities
///
/// All activities, newest first, without content detail.
pub async fn list(
    State(state): State<AppState>,
    RequireActivityManage(_user): RequireActivityManage,
) -> AppResult<Json<Vec<Activity>>> {
    let activities = ActivityRepo::list(&state.pool).await?;
    Ok(Json(activities))
}

/// GET /api/v1/activities/{id}
///
/// Admin detail view: the activity plus all contents, regardless of
/// language.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireActivityManage(_user): RequireActivityManage,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActivityWithContents>> {
    let (activity, contents) = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ActivityWithContents { activity, contents }))
}

/// GET /api/v1/activities/slug/{slug}?lang=
///
/// Public lookup. Contents are filtered to the requested language when
/// given, and always post-filtered against the activity's current
/// supported-language set so stale rows never leak out.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<SlugQuery>,
) -> AppResult<Json<PublicActivity>> {
    let lang = query.lang.as_deref().map(rules::normalize_lang);

    let (activity, contents) = ActivityRepo::find_by_slug(&state.pool, &slug, lang.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Activity",
                key: slug.clone(),
            })
        })?;

    // Drop any content whose language is no longer supported.
    let contents = contents
        .into_iter()
        .filter(|c| activity.supported_languages.contains(&c.lang))
        .map(|c| PublicContent {
            lang: c.lang,
            title: c.title,
            description: c.description,
        })
        .collect();

    Ok(Json(PublicActivity {
        slug: activity.slug,
        start_at: activity.start_at,
        end_at: activity.end_at,
        closed_at: activity.closed_at,
        supported_languages: activity.supported_languages,
        contents,
    }))
}

/// PATCH /api/v1/activities/{id}
///
/// Partial update. Date ordering is re-validated against the merged view
/// only when a date field is supplied; slug uniqueness only when the slug
/// actually changes; content languages only when contents are supplied.
/// The parent update and all content upserts commit atomically.
pub async fn update(
    State(state): State<AppState>,
    RequireActivityManage(_user): RequireActivityManage,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateActivity>,
) -> AppResult<Json<ActivityWithContents>> {
    // 1. Load the existing activity.
    let (existing, _) = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    // 2. Normalize supplied values.
    if let Some(slug) = &mut input.slug {
        *slug = slug.trim().to_lowercase();
    }
    if let Some(langs) = &mut input.supported_languages {
        for lang in langs.iter_mut() {
            *lang = rules::normalize_lang(lang);
        }
    }
    if let Some(contents) = &mut input.contents {
        for content in contents.iter_mut() {
            content.lang = rules::normalize_lang(&content.lang);
        }
    }

    // 3. Slug: validate shape, and re-check uniqueness only on change.
    if let Some(slug) = &input.slug {
        rules::validate_slug(slug)?;
        if *slug != existing.slug
            && ActivityRepo::slug_taken_by_other(&state.pool, slug, id).await?
        {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "slug '{slug}' is already taken"
            ))));
        }
    }

    // 4. Dates: re-validate the merged view only when a date was supplied.
    if input.start_at.is_some() || input.end_at.is_some() || input.closed_at.is_some() {
        let (start_at, end_at, closed_at) = rules::merged_schedule(
            (existing.start_at, existing.end_at, existing.closed_at),
            input.start_at,
            input.end_at,
            input.closed_at,
        );
        rules::validate_schedule(start_at, end_at, closed_at)?;
    }

    // 5. Supported languages: validate when supplied.
    if let Some(langs) = &input.supported_languages {
        rules::validate_supported_languages(langs)?;
    }

    // 6. Contents: validate against the merged supported-language set.
    if let Some(contents) = &input.contents {
        for content in contents {
            rules::validate_content_fields(&content.lang, &content.title)?;
        }
        let supported = input
            .supported_languages
            .as_ref()
            .unwrap_or(&existing.supported_languages);
        let langs: Vec<String> = contents.iter().map(|c| c.lang.clone()).collect();
        rules::validate_content_languages(&langs, supported)?;
    }

    // 7. Apply the field update + content upserts atomically.
    let (activity, contents) = ActivityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ActivityWithContents { activity, contents }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Activity",
        key: id.to_string(),
    })
}

fn normalize_languages(supported: &mut [String], contents: &mut [ContentInput]) {
    for lang in supported.iter_mut() {
        *lang = rules::normalize_lang(lang);
    }
    for content in contents.iter_mut() {
        content.lang = rules::normalize_lang(&content.lang);
    }
}
