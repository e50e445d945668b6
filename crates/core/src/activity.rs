//! Validation rules for activities and their multilingual contents.
//!
//! All checks run before any database write. Inputs are expected to be
//! normalized first (see [`normalize_lang`]); the validators report every
//! offending value, not just the first one found.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Slug shape: lowercase alphanumeric runs joined by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid"));

/// Locale tag shape: a 2-3 letter primary subtag, optionally followed by
/// 2-8 char alphanumeric subtags (`en`, `en-us`, `zh-tw`, ...).
static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").expect("locale regex is valid"));

/// Minimum slug length.
pub const SLUG_MIN_LEN: usize = 3;
/// Maximum slug length.
pub const SLUG_MAX_LEN: usize = 64;
/// Maximum stored length of a language code.
pub const LANG_MAX_LEN: usize = 15;
/// Maximum length of a content title.
pub const TITLE_MAX_LEN: usize = 255;

/// Lowercase a language code for storage and comparison.
pub fn normalize_lang(lang: &str) -> String {
    lang.trim().to_ascii_lowercase()
}

/// Check the slug pattern and length bounds.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() < SLUG_MIN_LEN || slug.len() > SLUG_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "slug must be {SLUG_MIN_LEN}-{SLUG_MAX_LEN} characters, got {}",
            slug.len()
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "slug '{slug}' must be lowercase alphanumeric tokens joined by hyphens"
        )));
    }
    Ok(())
}

/// Check that a (normalized) language code is a plausible locale tag.
pub fn validate_locale_tag(lang: &str) -> Result<(), CoreError> {
    if lang.is_empty() || lang.len() > LANG_MAX_LEN || !LOCALE_RE.is_match(lang) {
        return Err(CoreError::Validation(format!(
            "'{lang}' is not a valid language code"
        )));
    }
    Ok(())
}

/// Check the supported-language whitelist: non-empty, every entry a valid
/// (normalized) locale tag.
pub fn validate_supported_languages(langs: &[String]) -> Result<(), CoreError> {
    if langs.is_empty() {
        return Err(CoreError::Validation(
            "supportedLanguages must not be empty".into(),
        ));
    }
    for lang in langs {
        validate_locale_tag(lang)?;
    }
    Ok(())
}

/// Enforce the date ordering invariants: `end_at > start_at`, and
/// `closed_at < start_at` when a closure time is set.
pub fn validate_schedule(
    start_at: Timestamp,
    end_at: Timestamp,
    closed_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    if end_at <= start_at {
        return Err(CoreError::Validation(
            "endAt must be after startAt".into(),
        ));
    }
    if let Some(closed) = closed_at {
        if closed >= start_at {
            return Err(CoreError::Validation(
                "closedAt must be before startAt".into(),
            ));
        }
    }
    Ok(())
}

/// Check a batch of content language codes against the supported set.
///
/// Both slices must already be normalized. Reports every unsupported
/// language, then every duplicated one, naming the exact offenders.
pub fn validate_content_languages(
    content_langs: &[String],
    supported: &[String],
) -> Result<(), CoreError> {
    let supported: HashSet<&str> = supported.iter().map(String::as_str).collect();

    let unsupported: Vec<&str> = content_langs
        .iter()
        .map(String::as_str)
        .filter(|lang| !supported.contains(lang))
        .collect();
    if !unsupported.is_empty() {
        return Err(CoreError::Validation(format!(
            "unsupported content languages: {}",
            unsupported.join(", ")
        )));
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for lang in content_langs {
        if !seen.insert(lang.as_str()) && !duplicates.contains(&lang.as_str()) {
            duplicates.push(lang.as_str());
        }
    }
    if !duplicates.is_empty() {
        return Err(CoreError::Validation(format!(
            "duplicate content languages: {}",
            duplicates.join(", ")
        )));
    }

    Ok(())
}

/// Check a single content's title and language fields.
pub fn validate_content_fields(lang: &str, title: &str) -> Result<(), CoreError> {
    validate_locale_tag(lang)?;
    if title.is_empty() {
        return Err(CoreError::Validation(format!(
            "content '{lang}' is missing a title"
        )));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "content '{lang}' title exceeds {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Merge the existing schedule with a partial update.
///
/// `start_at`/`end_at` use `None` = "not supplied". `closed_at` is doubly
/// optional: outer `None` leaves the stored value unchanged, `Some(None)`
/// clears it, `Some(Some(t))` sets it.
pub fn merged_schedule(
    existing: (Timestamp, Timestamp, Option<Timestamp>),
    start_at: Option<Timestamp>,
    end_at: Option<Timestamp>,
    closed_at: Option<Option<Timestamp>>,
) -> (Timestamp, Timestamp, Option<Timestamp>) {
    let (cur_start, cur_end, cur_closed) = existing;
    (
        start_at.unwrap_or(cur_start),
        end_at.unwrap_or(cur_end),
        closed_at.unwrap_or(cur_closed),
    )
}
