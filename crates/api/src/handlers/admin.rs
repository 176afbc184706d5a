//! Back-office read endpoints under `/admin`: dashboard, occupancy calendar,
//! and reports. All require [`RequireStaff`].

use axum::extract::State;
use axum::Json;
use lodge_core::booking::CALENDAR_STATUSES;
use lodge_core::reporting::{
    average_value, build_calendar, month_bounds, month_containing, percentage, summarize,
    MonthCalendar, ReservationSummary,
};
use lodge_core::types::Money;
use lodge_db::models::report::CategoryRevenue;
use lodge_db::models::reservation::ReservationDetail;
use lodge_db::repositories::{ReportRepo, ReservationRepo};
use serde::Serialize;

use crate::booking::today_utc;
use crate::error::AppResult;
use crate::extract::{AppPath, AppQuery};
use crate::middleware::rbac::RequireStaff;
use crate::query::{DateRangeParams, ReservationReportParams};
use crate::state::AppState;

/// Number of reservations listed under `recentReservations`.
const RECENT_RESERVATIONS: i64 = 10;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub overview: DashboardOverview,
    pub today: DashboardToday,
    pub monthly: DashboardMonthly,
    pub recent_reservations: Vec<ReservationDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_rooms: i64,
    pub active_rooms: i64,
    pub current_guests: i64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardToday {
    pub check_ins: i64,
    pub check_outs: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardMonthly {
    pub reservations: i64,
    pub revenue: Money,
}

#[derive(Debug, Serialize)]
pub struct ReservationReport {
    pub reservations: Vec<ReservationDetail>,
    pub summary: ReservationSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub total_revenue: Money,
    pub total_reservations: i64,
    pub average_reservation_value: Money,
    pub revenue_by_room_type: Vec<CategoryRevenue>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<DashboardResponse>> {
    let today = today_utc();
    let (month_start, next_month) = month_containing(today);

    let counts = ReportRepo::dashboard_counts(&state.pool, today, month_start, next_month).await?;
    let recent = ReservationRepo::list_recent(&state.pool, RECENT_RESERVATIONS).await?;
    let recent = ReservationRepo::with_rooms(&state.pool, recent).await?;

    Ok(Json(DashboardResponse {
        overview: DashboardOverview {
            total_rooms: counts.total_rooms,
            active_rooms: counts.active_rooms,
            current_guests: counts.current_guests,
            occupancy_rate: percentage(counts.current_guests, counts.active_rooms),
        },
        today: DashboardToday {
            check_ins: counts.today_check_ins,
            check_outs: counts.today_check_outs,
        },
        monthly: DashboardMonthly {
            reservations: counts.monthly_reservations,
            revenue: counts.monthly_revenue,
        },
        recent_reservations: recent,
    }))
}

/// GET /api/admin/calendar/{year}/{month}
///
/// One entry per day of the month, keyed `YYYY-MM-DD`.
pub async fn calendar(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    AppPath((year, month)): AppPath<(i32, u32)>,
) -> AppResult<Json<MonthCalendar<ReservationDetail>>> {
    let (start, next) = month_bounds(year, month)?;

    let reservations =
        ReservationRepo::list_touching(&state.pool, start, next, &CALENDAR_STATUSES).await?;
    let details = ReservationRepo::with_rooms(&state.pool, reservations).await?;

    let calendar = build_calendar(year, month, &details, |d| d.reservation.stay())?;
    Ok(Json(calendar))
}

/// GET /api/admin/reports/reservations
pub async fn reservation_report(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    AppQuery(params): AppQuery<ReservationReportParams>,
) -> AppResult<Json<ReservationReport>> {
    let filter = params.to_filter()?;
    let reservations = ReservationRepo::list(&state.pool, &filter).await?;
    let summary = summarize(reservations.iter().filter_map(|r| r.figures()));
    let reservations = ReservationRepo::with_rooms(&state.pool, reservations).await?;

    Ok(Json(ReservationReport {
        reservations,
        summary,
    }))
}

/// GET /api/admin/reports/financial
///
/// Earned revenue (confirmed and completed stays), optionally bounded by
/// check-in date.
pub async fn financial_report(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    AppQuery(params): AppQuery<DateRangeParams>,
) -> AppResult<Json<FinancialReport>> {
    let (start, end) = params.bounds()?;

    let totals = ReportRepo::revenue_totals(&state.pool, start, end).await?;
    let by_category = ReportRepo::revenue_by_category(&state.pool, start, end).await?;

    Ok(Json(FinancialReport {
        total_revenue: totals.revenue,
        total_reservations: totals.reservations,
        average_reservation_value: average_value(totals.revenue, totals.reservations),
        revenue_by_room_type: by_category,
    }))
}
