//! Route definitions for the `/admin` back-office views.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the staff tier.
///
/// ```text
/// GET /dashboard                -> dashboard
/// GET /calendar/{year}/{month}  -> calendar
/// GET /reports/reservations     -> reservation_report
/// GET /reports/financial        -> financial_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/calendar/{year}/{month}", get(admin::calendar))
        .route("/reports/reservations", get(admin::reservation_report))
        .route("/reports/financial", get(admin::financial_report))
}
