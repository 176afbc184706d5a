//! Handlers for the `/auth` resource (login, profile, change-password).

use axum::extract::State;
use axum::Json;
use lodge_core::error::CoreError;
use lodge_db::models::user::UserResponse;
use lodge_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    has_required_character_classes, hash_password, validate_password_strength, verify_password,
    MIN_CHANGED_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`. `username` also accepts an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate with username (or email) and password. Unknown, inactive, and
/// wrong-password logins all get the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(login), Some(password)) = (
        input.username.filter(|u| !u.trim().is_empty()),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Username and password are required".into(),
        ));
    };

    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let user = UserRepo::find_active_by_login(&state.pool, login.trim())
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let token = generate_access_token(user.id, &user.username, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    // Reload so the response carries the fresh last_login_at.
    let user = UserRepo::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(invalid)?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/profile
pub async fn profile(auth_user: AuthUser) -> AppResult<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse {
        user: auth_user.user.into(),
    }))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (Some(current), Some(new_password)) = (
        input.current_password.filter(|p| !p.is_empty()),
        input.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Current password and new password are required".into(),
        ));
    };

    if validate_password_strength(&new_password, MIN_CHANGED_PASSWORD_LENGTH).is_err() {
        return Err(AppError::BadRequest(
            "New password must be at least 6 characters long".into(),
        ));
    }
    if !has_required_character_classes(&new_password) {
        return Err(AppError::BadRequest(
            "New password must contain at least one lowercase letter, one uppercase letter, and one number"
                .into(),
        ));
    }

    let current_valid = verify_password(&current, &auth_user.user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let new_hash = hash_password(&new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    if !UserRepo::update_password(&state.pool, auth_user.user_id, &new_hash).await? {
        return Err(CoreError::not_found("User", auth_user.user_id).into());
    }

    tracing::info!(user_id = auth_user.user_id, "Password changed");
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
