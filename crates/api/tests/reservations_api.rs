//! HTTP-level tests for the reservation lifecycle: guest booking, lookup and
//! self-cancellation, and staff management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, days_from_now, delete_auth, get, get_auth, patch_json, post_json, put_json_auth,
    reservation_body, seed_room, staff_token,
};
use lodge_api::config::BookingPolicy;
use lodge_core::booking::{
    MSG_CANCEL_WINDOW, MSG_CAPACITY_EXCEEDED, MSG_MISSING_FIELDS, MSG_NOT_AVAILABLE,
    MSG_PAST_CHECK_IN, MSG_ROOM_UNAVAILABLE, MSG_TOTAL_TOO_LARGE,
};
use lodge_db::repositories::RoomRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Book through the public endpoint and return the response body.
async fn book(pool: &PgPool, room_id: i64, check_in: &str, check_out: &str) -> serde_json::Value {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/reservations",
        reservation_body(room_id, check_in, check_out, 2),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn confirm(pool: &PgPool, id: i64, token: &str) {
    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/reservations/{id}"),
        json!({ "status": "confirmed" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// App whose staff edits re-run the availability checks.
fn revalidating_app(pool: &PgPool) -> axum::Router {
    let mut config = common::test_config();
    config.booking = BookingPolicy {
        revalidate_admin_date_changes: true,
        ..BookingPolicy::default()
    };
    common::build_test_app_with(pool.clone(), config)
}

async fn staff_edit(
    app: axum::Router,
    id: i64,
    body: serde_json::Value,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let response = put_json_auth(app, &format!("/api/reservations/{id}"), body, token).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Guest booking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn booking_prices_the_stay_and_publishes_an_event(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let (app, bus) = common::build_test_app_with_bus(pool);
    let mut events = bus.subscribe();

    let response = post_json(
        app,
        "/api/reservations",
        reservation_body(room.id, &days_from_now(10), &days_from_now(13), 2),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Reservation created successfully");
    assert_eq!(json["reservation"]["totalAmount"], "447.00");
    assert_eq!(json["reservation"]["status"], "PENDING");
    assert_eq!(json["reservation"]["specialRequests"], "Late arrival");
    assert_eq!(json["reservation"]["room"]["id"], room.id);
    assert_eq!(json["confirmationNumber"], json["reservation"]["confirmationCode"]);

    let event = events.try_recv().expect("a created event should be published");
    assert_eq!(event.event_type, lodge_events::bus::RESERVATION_CREATED);
    assert_eq!(event.notice.nights, 3);
    assert_eq!(event.notice.guest_email, "ada@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_stay_is_rejected_and_back_to_back_is_allowed(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;

    let first = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    confirm(&pool, first["reservation"]["id"].as_i64().unwrap(), &token).await;

    let overlapping = post_json(
        common::build_test_app(pool.clone()),
        "/api/reservations",
        reservation_body(room.id, &days_from_now(11), &days_from_now(13), 2),
    )
    .await;
    assert_eq!(overlapping.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(overlapping).await["message"], MSG_NOT_AVAILABLE);

    let adjacent = post_json(
        common::build_test_app(pool),
        "/api/reservations",
        reservation_body(room.id, &days_from_now(12), &days_from_now(14), 2),
    )
    .await;
    assert_eq!(adjacent.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_booking_frees_the_dates(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let first = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let code = first["confirmationNumber"].as_str().unwrap();

    let cancelled = patch_json(
        common::build_test_app(pool.clone()),
        &format!("/api/reservations/confirmation/{code}"),
        json!({ "status": "cancelled" }),
    )
    .await;
    assert_eq!(cancelled.status(), StatusCode::OK);

    book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn party_larger_than_capacity_is_rejected(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/reservations",
        reservation_body(room.id, &days_from_now(10), &days_from_now(12), 3),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], MSG_CAPACITY_EXCEEDED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn past_and_inverted_dates_are_rejected(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;

    let past = post_json(
        common::build_test_app(pool.clone()),
        "/api/reservations",
        reservation_body(room.id, "2020-01-10", "2020-01-12", 2),
    )
    .await;
    assert_eq!(past.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(past).await["message"], MSG_PAST_CHECK_IN);

    let same_day = post_json(
        common::build_test_app(pool),
        "/api/reservations",
        reservation_body(room.id, &days_from_now(5), &days_from_now(5), 2),
    )
    .await;
    assert_eq!(same_day.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_or_unknown_room_is_404(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    RoomRepo::deactivate(&pool, room.id).await.unwrap();

    for room_id in [room.id, 999_999] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            "/api/reservations",
            reservation_body(room_id, &days_from_now(10), &days_from_now(12), 2),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], MSG_ROOM_UNAVAILABLE);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_fields_come_before_field_validation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/reservations",
        json!({ "roomId": 1, "checkIn": days_from_now(3), "guests": 2 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], MSG_MISSING_FIELDS);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_fields_are_listed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = reservation_body(1, &days_from_now(10), &days_from_now(12), 2);
    body["guestInfo"]["phone"] = json!("12");
    body["guests"] = json!(12);

    let response = post_json(app, "/api/reservations", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let errors = json["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["field"] == "guestInfo.phone" && e["message"] == "Valid phone number is required"));
    assert!(errors.iter().any(|e| e["field"] == "guests"));
}

// ---------------------------------------------------------------------------
// Guest lookup and cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_by_confirmation_code(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let created = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let code = created["confirmationNumber"].as_str().unwrap();

    let found = get(
        common::build_test_app(pool.clone()),
        &format!("/api/reservations/confirmation/{code}"),
    )
    .await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["guestLastName"], "Lovelace");

    let missing = get(common::build_test_app(pool), "/api/reservations/confirmation/MBNOPE").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["message"], "Reservation not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_cancellation_respects_the_lead_time(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let soon = book(&pool, room.id, &days_from_now(1), &days_from_now(2)).await;
    let later = book(&pool, room.id, &days_from_now(2), &days_from_now(4)).await;

    let refused = patch_json(
        common::build_test_app(pool.clone()),
        &format!(
            "/api/reservations/confirmation/{}",
            soon["confirmationNumber"].as_str().unwrap()
        ),
        json!({ "status": "cancelled" }),
    )
    .await;
    assert_eq!(refused.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(refused).await["message"], MSG_CANCEL_WINDOW);

    let (app, bus) = common::build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();
    let allowed = patch_json(
        app,
        &format!(
            "/api/reservations/confirmation/{}",
            later["confirmationNumber"].as_str().unwrap()
        ),
        json!({ "status": "cancelled" }),
    )
    .await;
    assert_eq!(allowed.status(), StatusCode::OK);
    let json = body_json(allowed).await;
    assert_eq!(json["message"], "Reservation cancelled successfully");
    assert_eq!(json["reservation"]["status"], "CANCELLED");
    let event = events.try_recv().expect("a cancelled event should be published");
    assert_eq!(event.event_type, lodge_events::bus::RESERVATION_CANCELLED);

    let again = patch_json(
        common::build_test_app(pool),
        &format!(
            "/api/reservations/confirmation/{}",
            later["confirmationNumber"].as_str().unwrap()
        ),
        json!({ "status": "cancelled" }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(again).await["message"], "Reservation is already cancelled");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guests_can_only_request_cancellation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/api/reservations/confirmation/MBANYTHING",
        json!({ "status": "confirmed" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Guests can only cancel reservations"
    );
}

// ---------------------------------------------------------------------------
// Staff management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_list_filters_by_status_and_room(pool: PgPool) {
    let a = seed_room(&pool, "101", 2, "149.00").await;
    let b = seed_room(&pool, "102", 2, "149.00").await;
    let token = staff_token(&pool).await;

    let first = book(&pool, a.id, &days_from_now(10), &days_from_now(12)).await;
    book(&pool, a.id, &days_from_now(20), &days_from_now(22)).await;
    book(&pool, b.id, &days_from_now(10), &days_from_now(12)).await;
    confirm(&pool, first["reservation"]["id"].as_i64().unwrap(), &token).await;

    let all = body_json(
        get_auth(common::build_test_app(pool.clone()), "/api/reservations", &token).await,
    )
    .await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    // Newest check-in first.
    assert_eq!(all[0]["checkIn"], days_from_now(20));

    let confirmed = body_json(
        get_auth(
            common::build_test_app(pool.clone()),
            "/api/reservations?status=confirmed",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(confirmed.as_array().unwrap().len(), 1);

    let room_b = body_json(
        get_auth(
            common::build_test_app(pool),
            &format!("/api/reservations?roomId={}", b.id),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(room_b.as_array().unwrap().len(), 1);
    assert_eq!(room_b[0]["room"]["roomNumber"], "102");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_update_moves_dates_and_reprices(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    let created = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let id = created["reservation"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/reservations/{id}"),
        json!({ "checkOut": days_from_now(13), "guestPhone": "928-555-0199" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalAmount"], "447.00");
    assert_eq!(json["guestPhone"], "928-555-0199");
    assert_eq!(json["room"]["id"], room.id);

    let bad_status = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/reservations/{id}"),
        json!({ "status": "archived" }),
        &token,
    )
    .await;
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_delete_is_permanent(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    let created = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let id = created["reservation"]["id"].as_i64().unwrap();

    let deleted = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/reservations/{id}"),
        &token,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await["message"], "Reservation deleted successfully");

    let gone = get_auth(
        common::build_test_app(pool),
        &format!("/api/reservations/{id}"),
        &token,
    )
    .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_count_confirmed_against_active_rooms(pool: PgPool) {
    let a = seed_room(&pool, "101", 2, "149.00").await;
    seed_room(&pool, "102", 2, "149.00").await;
    let token = staff_token(&pool).await;

    let first = book(&pool, a.id, &days_from_now(10), &days_from_now(12)).await;
    book(&pool, a.id, &days_from_now(20), &days_from_now(21)).await;
    confirm(&pool, first["reservation"]["id"].as_i64().unwrap(), &token).await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/reservations/admin/stats",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalReservations"], 2);
    assert_eq!(json["monthlyReservations"], 2);
    assert_eq!(json["confirmedReservations"], 1);
    assert_eq!(json["totalRevenue"], "298.00");
    assert_eq!(json["totalRooms"], 2);
    assert_eq!(json["occupancyRate"], 50.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_overlapping_creates_leave_one_reservation(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let app = common::build_test_app(pool.clone());
    let (check_in, check_out) = (days_from_now(10), days_from_now(13));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let body = reservation_body(room.id, &check_in, &check_out, 2);
            tokio::spawn(async move { post_json(app, "/api/reservations", body).await.status() })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            other => assert_eq!(other, StatusCode::BAD_REQUEST),
        }
    }
    assert_eq!(created, 1);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE room_id = $1")
        .bind(room.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

// ---------------------------------------------------------------------------
// Staff edits with availability revalidation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_moves_skip_overlap_checks_by_default(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let later = book(&pool, room.id, &days_from_now(14), &days_from_now(16)).await;
    let id = later["reservation"]["id"].as_i64().unwrap();

    let (status, _) = staff_edit(
        common::build_test_app(pool),
        id,
        json!({ "checkIn": days_from_now(11) }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revalidated_moves_reject_overlaps_but_not_their_own_dates(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    let first = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let later = book(&pool, room.id, &days_from_now(14), &days_from_now(16)).await;
    let first_id = first["reservation"]["id"].as_i64().unwrap();
    let later_id = later["reservation"]["id"].as_i64().unwrap();

    let (status, json) = staff_edit(
        revalidating_app(&pool),
        later_id,
        json!({ "checkIn": days_from_now(11) }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], MSG_NOT_AVAILABLE);

    // Extending over its own nights is not a conflict.
    let (status, json) = staff_edit(
        revalidating_app(&pool),
        first_id,
        json!({ "checkOut": days_from_now(13) }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalAmount"], "447.00");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revalidated_edits_check_capacity(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    let created = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let id = created["reservation"]["id"].as_i64().unwrap();

    let (status, json) =
        staff_edit(revalidating_app(&pool), id, json!({ "guests": 4 }), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], MSG_CAPACITY_EXCEEDED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reopening_a_cancelled_booking_is_checked_for_overlap(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "149.00").await;
    let token = staff_token(&pool).await;
    let original = book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;
    let original_id = original["reservation"]["id"].as_i64().unwrap();

    let (status, _) = staff_edit(
        revalidating_app(&pool),
        original_id,
        json!({ "status": "cancelled" }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The freed dates are rebooked by someone else.
    book(&pool, room.id, &days_from_now(10), &days_from_now(12)).await;

    let (status, json) = staff_edit(
        revalidating_app(&pool),
        original_id,
        json!({ "status": "confirmed" }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], MSG_NOT_AVAILABLE);

    // Closing it out as completed does not claim the dates.
    let (status, json) = staff_edit(
        revalidating_app(&pool),
        original_id,
        json!({ "status": "completed" }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "COMPLETED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stay_priced_beyond_the_stored_precision_is_refused(pool: PgPool) {
    let room = seed_room(&pool, "101", 2, "99999999.99").await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/reservations",
        reservation_body(room.id, &days_from_now(10), &days_from_now(12), 2),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], MSG_TOTAL_TOO_LARGE);
}
