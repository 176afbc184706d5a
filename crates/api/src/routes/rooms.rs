//! Route definitions for the `/rooms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rooms;
use crate::state::AppState;

/// Routes mounted at `/rooms`.
///
/// ```text
/// GET    /                    -> list_rooms
/// POST   /                    -> create_room (staff)
/// POST   /check-availability  -> check_availability
/// POST   /available           -> available_rooms
/// GET    /{id}                -> get_room
/// PUT    /{id}                -> update_room (staff)
/// DELETE /{id}                -> delete_room (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rooms::list_rooms).post(rooms::create_room))
        .route("/check-availability", post(rooms::check_availability))
        .route("/available", post(rooms::available_rooms))
        .route(
            "/{id}",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
}
