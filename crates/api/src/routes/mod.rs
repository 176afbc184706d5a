pub mod admin;
pub mod auth;
pub mod health;
pub mod reservations;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rooms                                    list (public), create (staff)
/// /rooms/check-availability                 single-room availability (public)
/// /rooms/available                          rooms free for a stay (public)
/// /rooms/{id}                               get (public), update, deactivate (staff)
///
/// /reservations                             create (public), list (staff)
/// /reservations/confirmation/{code}         lookup, guest cancel (public)
/// /reservations/admin/stats                 headline stats (staff)
/// /reservations/{id}                        get, update, delete (staff)
///
/// /auth/login                               login (public)
/// /auth/profile                             current user (auth required)
/// /auth/change-password                     change own password (auth required)
/// /auth/users                               list, create (admin only)
/// /auth/users/{id}                          get, update, deactivate (admin only)
///
/// /admin/dashboard                          dashboard (staff)
/// /admin/calendar/{year}/{month}            occupancy calendar (staff)
/// /admin/reports/reservations               reservation report (staff)
/// /admin/reports/financial                  financial report (staff)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rooms", rooms::router())
        .nest("/reservations", reservations::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
