//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the JWT Bearer token to an active user.
//! - [`rbac::RequireStaff`] -- Requires the `staff` or `admin` role.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
