//! Route definitions for the `/reservations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// POST   /                      -> create_reservation
/// GET    /                      -> list_reservations (staff)
/// GET    /confirmation/{code}   -> get_by_confirmation
/// PATCH  /confirmation/{code}   -> cancel_by_confirmation
/// GET    /admin/stats           -> reservation_stats (staff)
/// GET    /{id}                  -> get_reservation (staff)
/// PUT    /{id}                  -> update_reservation (staff)
/// DELETE /{id}                  -> delete_reservation (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/confirmation/{code}",
            get(reservations::get_by_confirmation).patch(reservations::cancel_by_confirmation),
        )
        .route("/admin/stats", get(reservations::reservation_stats))
        .route(
            "/{id}",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
}
