//! Well-known permission code constants and the authorization check.
//!
//! These must match the seed data in
//! `20260301000004_create_roles_and_permissions.sql`.

/// Grants full management of activities and their contents.
pub const PERM_ACTIVITY_MANAGE: &str = "activity:manage";

/// Check that every required permission is present in the granted set.
///
/// An empty requirement always passes. The check is a plain superset test;
/// callers decide how to surface a failure (the API maps it to 403 without
/// leaking which permissions were missing).
pub fn has_all(granted: &[String], required: &[&str]) -> bool {
    required
        .iter()
        .all(|req| granted.iter().any(|perm| perm == req))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirement_always_passes() {
        assert!(has_all(&[], &[]));
        assert!(has_all(&["activity:manage".to_string()], &[]));
    }

    #[test]
    fn missing_permission_fails() {
        assert!(!has_all(&[], &[PERM_ACTIVITY_MANAGE]));
        assert!(!has_all(
            &["user:read".to_string()],
            &[PERM_ACTIVITY_MANAGE]
        ));
    }

    #[test]
    fn superset_passes() {
        let granted = vec!["user:read".to_string(), "activity:manage".to_string()];
        assert!(has_all(&granted, &[PERM_ACTIVITY_MANAGE]));
        assert!(has_all(&granted, &["user:read", "activity:manage"]));
    }
}
