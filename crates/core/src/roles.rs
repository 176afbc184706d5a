//! Well-known role names and the role sets used for route authorization.
//!
//! These must match the `chk_users_role` constraint in
//! `20260101000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// Roles allowed on admin-only endpoints (user management).
pub const ADMIN_ONLY: &[&str] = &[ROLE_ADMIN];

/// Roles allowed on back-office endpoints (rooms, reservations, reports).
pub const STAFF_OR_ADMIN: &[&str] = &[ROLE_ADMIN, ROLE_STAFF];

/// Whether `role` is one of the `allowed` role names.
pub fn is_permitted(role: &str, allowed: &[&str]) -> bool {
    allowed.contains(&role)
}

/// Normalize a user-supplied role name. Anything other than `admin`
/// (case-insensitive) becomes `staff`.
pub fn normalize_role(raw: &str) -> &'static str {
    if raw.eq_ignore_ascii_case(ROLE_ADMIN) {
        ROLE_ADMIN
    } else {
        ROLE_STAFF
    }
}
