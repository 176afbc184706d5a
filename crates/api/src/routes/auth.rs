//! Route definitions for the `/auth` resource, including admin user
//! management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, users};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /login            -> login
/// GET    /profile          -> profile (requires auth)
/// POST   /change-password  -> change_password (requires auth)
/// GET    /users            -> list_users (admin)
/// POST   /users            -> create_user (admin)
/// GET    /users/{id}       -> get_user (admin)
/// PUT    /users/{id}       -> update_user (admin)
/// DELETE /users/{id}       -> deactivate_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile))
        .route("/change-password", post(auth::change_password))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::deactivate_user),
        )
}
