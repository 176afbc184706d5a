//! Aggregate queries behind the dashboard, stats, and financial reports.

use chrono::NaiveDate;
use lodge_core::booking::{status_names, ReservationStatus, BLOCKING_STATUSES, REVENUE_STATUSES};
use lodge_core::types::start_of_day;
use sqlx::PgPool;

use crate::models::report::{CategoryRevenue, DashboardCounts, ReservationStatsRow, RevenueTotals};

pub struct ReportRepo;

impl ReportRepo {
    /// Dashboard counters as of `today`, with monthly figures over
    /// `[month_start, next_month)`.
    pub async fn dashboard_counts(
        pool: &PgPool,
        today: NaiveDate,
        month_start: NaiveDate,
        next_month: NaiveDate,
    ) -> Result<DashboardCounts, sqlx::Error> {
        sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                (SELECT COUNT(*) FROM rooms) AS total_rooms,
                (SELECT COUNT(*) FROM rooms WHERE is_active = true) AS active_rooms,
                (SELECT COUNT(*) FROM reservations
                  WHERE check_in <= $1 AND check_out > $1 AND status = ANY($2)) AS current_guests,
                (SELECT COUNT(*) FROM reservations
                  WHERE check_in = $1 AND status = ANY($3)) AS today_check_ins,
                (SELECT COUNT(*) FROM reservations
                  WHERE check_out = $1 AND status = ANY($2)) AS today_check_outs,
                (SELECT COUNT(*) FROM reservations
                  WHERE created_at >= $4 AND created_at < $5 AND status <> $8) AS monthly_reservations,
                (SELECT COALESCE(SUM(total_amount), 0) FROM reservations
                  WHERE check_in >= $6 AND check_in < $7 AND status = ANY($2)) AS monthly_revenue",
        )
        .bind(today)
        .bind(status_names(&REVENUE_STATUSES))
        .bind(status_names(&BLOCKING_STATUSES))
        .bind(start_of_day(month_start))
        .bind(start_of_day(next_month))
        .bind(month_start)
        .bind(next_month)
        .bind(ReservationStatus::Cancelled.as_str())
        .fetch_one(pool)
        .await
    }

    /// Lifetime and current-month reservation figures.
    pub async fn reservation_stats(
        pool: &PgPool,
        month_start: NaiveDate,
        next_month: NaiveDate,
    ) -> Result<ReservationStatsRow, sqlx::Error> {
        sqlx::query_as::<_, ReservationStatsRow>(
            "SELECT
                (SELECT COUNT(*) FROM reservations) AS total_reservations,
                (SELECT COUNT(*) FROM reservations
                  WHERE created_at >= $1 AND created_at < $2) AS monthly_reservations,
                (SELECT COUNT(*) FROM reservations WHERE status = $5) AS confirmed_reservations,
                (SELECT COALESCE(SUM(total_amount), 0) FROM reservations
                  WHERE status = ANY($6)) AS total_revenue,
                (SELECT COALESCE(SUM(total_amount), 0) FROM reservations
                  WHERE status = ANY($6) AND check_in >= $3 AND check_in < $4) AS monthly_revenue,
                (SELECT COUNT(*) FROM rooms WHERE is_active = true) AS active_rooms",
        )
        .bind(start_of_day(month_start))
        .bind(start_of_day(next_month))
        .bind(month_start)
        .bind(next_month)
        .bind(ReservationStatus::Confirmed.as_str())
        .bind(status_names(&REVENUE_STATUSES))
        .fetch_one(pool)
        .await
    }

    /// Earned revenue and reservation count, check-in bounds inclusive.
    pub async fn revenue_totals(
        pool: &PgPool,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<RevenueTotals, sqlx::Error> {
        sqlx::query_as::<_, RevenueTotals>(
            "SELECT COALESCE(SUM(total_amount), 0) AS revenue, COUNT(*) AS reservations
             FROM reservations
             WHERE status = ANY($1)
               AND ($2::DATE IS NULL OR check_in >= $2)
               AND ($3::DATE IS NULL OR check_in <= $3)",
        )
        .bind(status_names(&REVENUE_STATUSES))
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }

    /// Earned revenue grouped by room category.
    pub async fn revenue_by_category(
        pool: &PgPool,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryRevenue>, sqlx::Error> {
        sqlx::query_as::<_, CategoryRevenue>(
            "SELECT rm.room_type,
                    COALESCE(SUM(r.total_amount), 0) AS revenue,
                    COUNT(r.id) AS reservations
             FROM reservations r
             JOIN rooms rm ON rm.id = r.room_id
             WHERE r.status = ANY($1)
               AND ($2::DATE IS NULL OR r.check_in >= $2)
               AND ($3::DATE IS NULL OR r.check_in <= $3)
             GROUP BY rm.room_type
             ORDER BY rm.room_type",
        )
        .bind(status_names(&REVENUE_STATUSES))
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }
}
