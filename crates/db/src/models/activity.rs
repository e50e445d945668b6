//! Activity entity models and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use opencall_core::types::{DbId, Timestamp};

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub supported_languages: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `activity_contents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityContent {
    pub id: DbId,
    pub activity_id: DbId,
    pub lang: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An activity together with its content rows, as returned by the admin
/// detail and update endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityWithContents {
    #[serde(flatten)]
    pub activity: Activity,
    pub contents: Vec<ActivityContent>,
}

/// One per-language content in a create or update payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentInput {
    pub lang: String,
    pub title: String,
    pub description: Option<String>,
}

/// DTO for creating a new activity with its initial contents.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub name: String,
    pub slug: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub supported_languages: Vec<String>,
    pub contents: Vec<ContentInput>,
}

/// DTO for partially updating an activity. All fields are optional.
///
/// `closed_at` is doubly optional so an explicit `null` (clear the closure
/// time) is distinguishable from the field being absent (leave unchanged).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActivity {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "double_option")]
    pub closed_at: Option<Option<Timestamp>>,
    pub supported_languages: Option<Vec<String>>,
    pub contents: Option<Vec<ContentInput>>,
}

/// Deserialize a present field (including `null`) as `Some(inner)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None` while
/// `"closed_at": null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
