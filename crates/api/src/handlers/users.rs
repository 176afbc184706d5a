//! Admin-only user management under `/auth/users`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lodge_core::error::CoreError;
use lodge_core::roles::{normalize_role, ROLE_STAFF};
use lodge_core::types::DbId;
use lodge_db::models::user::{CreateUser, UpdateUser, UserResponse};
use lodge_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::MessageResponse;
use crate::state::AppState;
use crate::validation::{validate_password_classes, validate_role_name, validate_username_chars};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Username must be 3-30 characters long"),
        length(min = 3, max = 30, message = "Username must be 3-30 characters long"),
        custom(
            function = validate_username_chars,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "Valid email is required"),
        email(message = "Valid email is required")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password must be at least 8 characters long"),
        length(min = 8, message = "Password must be at least 8 characters long"),
        custom(function = validate_password_classes, message = "Password must contain at least one lowercase letter, one uppercase letter, and one number")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "First name is required and must be less than 50 characters"),
        length(
            min = 1,
            max = 50,
            message = "First name is required and must be less than 50 characters"
        )
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Last name is required and must be less than 50 characters"),
        length(
            min = 1,
            max = 50,
            message = "Last name is required and must be less than 50 characters"
        )
    )]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_role_name, message = "Role must be admin or staff"))]
    pub role: Option<String>,
}

/// Request body for `PUT /auth/users/{id}`. A `password` resets the user's
/// password.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "First name is required and must be less than 50 characters"
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name is required and must be less than 50 characters"
    ))]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_role_name, message = "Role must be admin or staff"))]
    pub role: Option<String>,
    pub is_active: Option<bool>,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters long"),
        custom(function = validate_password_classes, message = "Password must contain at least one lowercase letter, one uppercase letter, and one number")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserMessageResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserMessageResponse>)> {
    input.validate()?;

    let (Some(username), Some(email), Some(password), Some(first_name), Some(last_name)) = (
        input.username,
        input.email,
        input.password,
        input.first_name,
        input.last_name,
    ) else {
        return Err(AppError::BadRequest("All fields are required".into()));
    };

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let role = input.role.as_deref().map(normalize_role).unwrap_or(ROLE_STAFF);

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            role: role.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, actor_user_id = admin.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(UserMessageResponse {
            message: "User created successfully",
            user: user.into(),
        }),
    ))
}

/// GET /api/auth/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/auth/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;
    Ok(Json(user.into()))
}

/// PUT /api/auth/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserMessageResponse>> {
    input.validate()?;

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(
            hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
        ),
        None => None,
    };

    let update = UpdateUser {
        email: input.email.map(|e| e.trim().to_lowercase()),
        first_name: input.first_name.map(|n| n.trim().to_string()),
        last_name: input.last_name.map(|n| n.trim().to_string()),
        role: input.role.as_deref().map(|r| normalize_role(r).to_string()),
        is_active: input.is_active,
        password_hash,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", id))?;

    tracing::info!(user_id = id, actor_user_id = admin.user_id, "User updated");
    Ok(Json(UserMessageResponse {
        message: "User updated successfully",
        user: user.into(),
    }))
}

/// DELETE /api/auth/users/{id}
///
/// Soft delete: the account can no longer log in and existing tokens stop
/// working on their next request.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(CoreError::not_found("User", id).into());
    }
    tracing::info!(user_id = id, actor_user_id = admin.user_id, "User deactivated");
    Ok(Json(MessageResponse::new("User deactivated successfully")))
}
