//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and checks the role against a role set
//! from `lodge_core::roles`. Insufficient roles are rejected with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lodge_core::error::CoreError;
use lodge_core::roles::{is_permitted, ADMIN_ONLY, STAFF_OR_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn require_role(user: &AuthUser, allowed: &[&str], message: &str) -> Result<(), AppError> {
    if is_permitted(&user.role, allowed) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(message.into())))
    }
}

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, ADMIN_ONLY, "Admin access required")?;
        Ok(RequireAdmin(user))
    }
}

/// Requires the `staff` or `admin` role (the back-office tier).
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(&user, STAFF_OR_ADMIN, "Staff access required")?;
        Ok(RequireStaff(user))
    }
}
