//! Aggregate rows returned by `ReportRepo`.

use lodge_core::types::Money;
use serde::Serialize;
use sqlx::FromRow;

/// Headline counts for the staff dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct DashboardCounts {
    pub total_rooms: i64,
    pub active_rooms: i64,
    pub current_guests: i64,
    pub today_check_ins: i64,
    pub today_check_outs: i64,
    pub monthly_reservations: i64,
    pub monthly_revenue: Money,
}

/// Counts behind `/reservations/admin/stats`.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationStatsRow {
    pub total_reservations: i64,
    pub monthly_reservations: i64,
    pub confirmed_reservations: i64,
    pub total_revenue: Money,
    pub monthly_revenue: Money,
    pub active_rooms: i64,
}

/// Revenue total and count over a window.
#[derive(Debug, Clone, FromRow)]
pub struct RevenueTotals {
    pub revenue: Money,
    pub reservations: i64,
}

/// Revenue and count for one room category.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub room_type: String,
    pub revenue: Money,
    pub reservations: i64,
}
