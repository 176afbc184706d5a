//! HTTP-level tests for the back-office dashboard, calendar, and reports.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Days};
use common::{body_json, get, get_auth, seed_room, staff_token, today};
use lodge_core::booking::ReservationStatus;
use lodge_core::types::Money;
use lodge_db::models::reservation::NewReservation;
use lodge_db::models::room::Room;
use lodge_db::repositories::{ReservationRepo, RoomRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a reservation directly, bypassing the past-date rule so stays can
/// straddle today.
async fn seed_reservation(
    pool: &PgPool,
    room: &Room,
    code: &str,
    check_in: chrono::NaiveDate,
    nights: u64,
    status: ReservationStatus,
) -> i64 {
    let check_out = check_in.checked_add_days(Days::new(nights)).unwrap();
    let mut tx = pool.begin().await.unwrap();
    let reservation = ReservationRepo::insert(
        &mut tx,
        &NewReservation {
            confirmation_code: code.to_string(),
            guest_first_name: "Ada".to_string(),
            guest_last_name: "Lovelace".to_string(),
            guest_email: "ada@example.com".to_string(),
            guest_phone: "928-555-0100".to_string(),
            guest_street: None,
            guest_city: None,
            guest_state: None,
            guest_zip_code: None,
            room_id: room.id,
            check_in,
            check_out,
            guests: 2,
            total_amount: room.base_price * Money::from(nights),
            special_requests: String::new(),
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    ReservationRepo::set_status(pool, reservation.id, status)
        .await
        .unwrap();
    reservation.id
}

fn days_ago(n: u64) -> chrono::NaiveDate {
    today().checked_sub_days(Days::new(n)).unwrap()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dashboard_counts_current_guests_and_todays_movements(pool: PgPool) {
    let a = seed_room(&pool, "101", 2, "100.00").await;
    let b = seed_room(&pool, "102", 2, "100.00").await;
    let c = seed_room(&pool, "103", 2, "100.00").await;
    let retired = seed_room(&pool, "104", 2, "100.00").await;
    RoomRepo::deactivate(&pool, retired.id).await.unwrap();

    // In house since yesterday, leaving tomorrow.
    seed_reservation(&pool, &a, "MBDASH1", days_ago(1), 2, ReservationStatus::Confirmed).await;
    // Arriving today.
    seed_reservation(&pool, &b, "MBDASH2", today(), 1, ReservationStatus::Pending).await;
    // Left today.
    seed_reservation(&pool, &c, "MBDASH3", days_ago(2), 2, ReservationStatus::Completed).await;

    let token = staff_token(&pool).await;
    let response = get_auth(common::build_test_app(pool), "/api/admin/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["overview"]["totalRooms"], 4);
    assert_eq!(json["overview"]["activeRooms"], 3);
    assert_eq!(json["overview"]["currentGuests"], 1);
    assert_eq!(json["overview"]["occupancyRate"], 33.3);
    assert_eq!(json["today"]["checkIns"], 1);
    assert_eq!(json["today"]["checkOuts"], 1);
    assert_eq!(json["monthly"]["reservations"], 3);
    assert_eq!(json["recentReservations"].as_array().unwrap().len(), 3);
    assert!(json["recentReservations"][0]["room"].is_object());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_views_require_staff(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendar_buckets_stays_by_day(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let check_in = chrono::NaiveDate::from_ymd_opt(2031, 1, 10).unwrap();
    seed_reservation(&pool, &room, "MBCAL1", check_in, 2, ReservationStatus::Confirmed).await;
    seed_reservation(&pool, &room, "MBCAL2", check_in, 2, ReservationStatus::Cancelled).await;

    let token = staff_token(&pool).await;
    let response = get_auth(
        common::build_test_app(pool),
        "/api/admin/calendar/2031/1",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json.as_object().unwrap().len(), 31);
    assert_eq!(json["2031-01-10"]["checkIns"].as_array().unwrap().len(), 1);
    assert_eq!(json["2031-01-10"]["currentGuests"].as_array().unwrap().len(), 1);
    assert_eq!(json["2031-01-11"]["currentGuests"].as_array().unwrap().len(), 1);
    assert_eq!(json["2031-01-12"]["checkOuts"].as_array().unwrap().len(), 1);
    assert_eq!(json["2031-01-12"]["currentGuests"].as_array().unwrap().len(), 0);
    assert_eq!(json["2031-01-10"]["checkIns"][0]["confirmationCode"], "MBCAL1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn calendar_rejects_invalid_month(pool: PgPool) {
    let token = staff_token(&pool).await;
    let response = get_auth(
        common::build_test_app(pool),
        "/api/admin/calendar/2031/13",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reservation_report_summarizes_filtered_rows(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "100.00").await;
    let base = chrono::NaiveDate::from_ymd_opt(2031, 3, 1).unwrap();
    seed_reservation(&pool, &room, "MBREP1", base, 2, ReservationStatus::Confirmed).await;
    seed_reservation(
        &pool,
        &room,
        "MBREP2",
        base.checked_add_days(Days::new(5)).unwrap(),
        3,
        ReservationStatus::Completed,
    )
    .await;
    seed_reservation(
        &pool,
        &room,
        "MBREP3",
        base.with_month(6).unwrap(),
        1,
        ReservationStatus::Confirmed,
    )
    .await;

    let token = staff_token(&pool).await;
    let response = get_auth(
        common::build_test_app(pool),
        "/api/admin/reports/reservations?startDate=2031-03-01&endDate=2031-03-31&roomType=historic",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["reservations"].as_array().unwrap().len(), 2);
    assert_eq!(json["summary"]["totalReservations"], 2);
    assert_eq!(json["summary"]["totalRevenue"], "500.00");
    assert_eq!(json["summary"]["averageStay"], 2.5);
    assert_eq!(json["summary"]["statusBreakdown"]["CONFIRMED"], 1);
    assert_eq!(json["summary"]["statusBreakdown"]["COMPLETED"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn financial_report_counts_earned_revenue_by_category(pool: PgPool) {
    let historic = seed_room(&pool, "101", 2, "100.00").await;
    let cabin = RoomRepo::create(
        &pool,
        &lodge_db::models::room::CreateRoom {
            name: "Family Cabin 1".to_string(),
            room_number: "C1".to_string(),
            room_type: "FAMILY_CABIN".to_string(),
            description: None,
            capacity: 6,
            base_price: common::money("250.00"),
            amenities: vec![],
            images: vec![],
        },
    )
    .await
    .unwrap();

    let day = chrono::NaiveDate::from_ymd_opt(2031, 5, 1).unwrap();
    seed_reservation(&pool, &historic, "MBFIN1", day, 1, ReservationStatus::Confirmed).await;
    seed_reservation(&pool, &cabin, "MBFIN2", day, 2, ReservationStatus::Completed).await;
    seed_reservation(&pool, &cabin, "MBFIN3", day, 1, ReservationStatus::Pending).await;

    let token = staff_token(&pool).await;
    let response = get_auth(
        common::build_test_app(pool),
        "/api/admin/reports/financial?startDate=2031-05-01&endDate=2031-05-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["totalRevenue"], "600.00");
    assert_eq!(json["totalReservations"], 2);
    assert_eq!(json["averageReservationValue"], "300.00");
    let by_type = json["revenueByRoomType"].as_array().unwrap();
    assert_eq!(by_type.len(), 2);
    assert_eq!(by_type[0]["roomType"], "FAMILY_CABIN");
    assert_eq!(by_type[0]["revenue"], "500.00");
    assert_eq!(by_type[1]["roomType"], "HISTORIC");
}
