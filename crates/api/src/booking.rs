//! Reservation engine: create, cancel, staff edits, and delete.
//!
//! Handlers parse and validate request bodies, then call into this module,
//! which owns the transactional parts of the reservation lifecycle and
//! publishes guest-notification events once a change is committed.

use chrono::{NaiveDate, Utc};
use lodge_core::booking::{
    ensure_capacity, ensure_guest_cancel_request, ensure_guest_cancellable, price_stay,
    validate_new_stay, ReservationStatus, StayRange, MSG_NOT_AVAILABLE, MSG_ROOM_UNAVAILABLE,
};
use lodge_core::error::CoreError;
use lodge_core::types::{DbId, Money, Timestamp};
use lodge_db::models::reservation::{NewReservation, ReservationDetail, UpdateReservation};
use lodge_db::repositories::{ReservationRepo, RoomRepo};
use lodge_events::{BookingEvent, ReservationNotice};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::state::AppState;

/// Attempts at inserting with a fresh confirmation code before giving up.
const MAX_CODE_ATTEMPTS: usize = 3;

const CONFIRMATION_CODE_CONSTRAINT: &str = "uq_reservations_confirmation_code";

/// Guest contact snapshot stored on the reservation.
#[derive(Debug, Clone)]
pub struct GuestDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// A parsed, field-validated booking request.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub room_id: DbId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub guest: GuestDetails,
    pub special_requests: String,
}

/// Staff edits to an existing reservation. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReservationChanges {
    pub guest_first_name: Option<String>,
    pub guest_last_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_street: Option<String>,
    pub guest_city: Option<String>,
    pub guest_state: Option<String>,
    pub guest_zip_code: Option<String>,
    pub room_id: Option<DbId>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    /// Explicit price override. Ignored when the dates or room change.
    pub total_amount: Option<Money>,
    /// Raw status text; normalized before it is stored.
    pub status: Option<String>,
    pub special_requests: Option<String>,
}

impl ReservationChanges {
    fn moves_stay(&self) -> bool {
        self.room_id.is_some() || self.check_in.is_some() || self.check_out.is_some()
    }
}

/// Today's calendar date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Snapshot a reservation for the notification dispatcher.
pub fn notice_for(detail: &ReservationDetail) -> ReservationNotice {
    let r = &detail.reservation;
    ReservationNotice {
        confirmation_code: r.confirmation_code.clone(),
        guest_first_name: r.guest_first_name.clone(),
        guest_last_name: r.guest_last_name.clone(),
        guest_email: r.guest_email.clone(),
        guest_phone: r.guest_phone.clone(),
        room_name: detail.room.name.clone(),
        check_in: r.check_in,
        check_out: r.check_out,
        nights: r.stay().map(|s| s.nights()).unwrap_or_default(),
        guests: r.guests,
        total_amount: r.total_amount,
        special_requests: r.special_requests.clone(),
    }
}

/// Create a `PENDING` reservation.
///
/// Checks run in order: date range, check-in not before `today`, then inside
/// one transaction holding the room's row lock: room exists and is active,
/// party fits, no blocking overlap. A confirmation-code collision retries
/// with a fresh code.
pub async fn create_reservation(
    state: &AppState,
    request: BookingRequest,
    today: NaiveDate,
) -> AppResult<ReservationDetail> {
    let stay = validate_new_stay(request.check_in, request.check_out, today)?;

    let mut attempt = 0;
    let reservation = loop {
        attempt += 1;
        let mut tx = state.pool.begin().await?;

        let room = RoomRepo::lock_for_booking(&mut tx, request.room_id)
            .await?
            .filter(|room| room.is_active)
            .ok_or_else(|| CoreError::Unavailable(MSG_ROOM_UNAVAILABLE.into()))?;

        ensure_capacity(request.guests, room.capacity)?;

        let overlapping = ReservationRepo::has_overlap(
            &mut *tx,
            room.id,
            stay.check_in(),
            stay.check_out(),
            None,
        )
        .await?;
        if overlapping {
            return Err(CoreError::BusinessRule(MSG_NOT_AVAILABLE.into()).into());
        }

        let input = NewReservation {
            confirmation_code: state.confirmation_codes.next_code(),
            guest_first_name: request.guest.first_name.clone(),
            guest_last_name: request.guest.last_name.clone(),
            guest_email: request.guest.email.clone(),
            guest_phone: request.guest.phone.clone(),
            guest_street: request.guest.street.clone(),
            guest_city: request.guest.city.clone(),
            guest_state: request.guest.state.clone(),
            guest_zip_code: request.guest.zip_code.clone(),
            room_id: room.id,
            check_in: stay.check_in(),
            check_out: stay.check_out(),
            guests: request.guests,
            total_amount: price_stay(&stay, room.base_price)?,
            special_requests: request.special_requests.clone(),
        };

        match ReservationRepo::insert(&mut tx, &input).await {
            Ok(reservation) => {
                tx.commit().await?;
                break reservation;
            }
            Err(e)
                if attempt < MAX_CODE_ATTEMPTS
                    && is_unique_violation(&e, CONFIRMATION_CODE_CONSTRAINT) =>
            {
                tracing::warn!(
                    code = %input.confirmation_code,
                    attempt,
                    "Confirmation code collision, retrying"
                );
            }
            Err(e) => return Err(e.into()),
        }
    };

    let detail = ReservationRepo::with_room(&state.pool, reservation).await?;
    tracing::info!(
        reservation_id = detail.reservation.id,
        code = %detail.reservation.confirmation_code,
        room_id = detail.room.id,
        "Reservation created"
    );

    state
        .event_bus
        .publish(BookingEvent::created(detail.reservation.id, notice_for(&detail)));

    Ok(detail)
}

/// Guest self-service cancellation by confirmation code.
pub async fn cancel_by_code(
    state: &AppState,
    code: &str,
    requested_status: Option<&str>,
    now: Timestamp,
) -> AppResult<ReservationDetail> {
    ensure_guest_cancel_request(requested_status)?;

    let reservation = ReservationRepo::find_by_code(&state.pool, code)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Reservation",
            key: code.to_string(),
        })?;

    let status = reservation.status().ok_or_else(|| {
        CoreError::Internal(format!("Unknown status '{}' on reservation", reservation.status))
    })?;
    ensure_guest_cancellable(
        status,
        reservation.check_in,
        now,
        state.config.booking.cancellation_lead_hours,
    )?;

    let cancelled = ReservationRepo::set_status(&state.pool, reservation.id, ReservationStatus::Cancelled)
        .await?
        .ok_or_else(|| CoreError::not_found("Reservation", reservation.id))?;

    let detail = ReservationRepo::with_room(&state.pool, cancelled).await?;
    tracing::info!(
        reservation_id = detail.reservation.id,
        code = %detail.reservation.confirmation_code,
        "Reservation cancelled by guest"
    );

    state
        .event_bus
        .publish(BookingEvent::cancelled(detail.reservation.id, notice_for(&detail)));

    Ok(detail)
}

/// Staff partial update.
///
/// Status text is normalized to the canonical set. When the dates or room
/// change, the new range must be valid and the total is recomputed from the
/// room's current rate. With `revalidate_admin_date_changes` on, the room
/// must also be active, the party must fit, and the new stay must not
/// overlap another blocking reservation. Moving a cancelled or completed
/// reservation back to a blocking status is checked the same way.
pub async fn update_reservation(
    state: &AppState,
    id: DbId,
    changes: ReservationChanges,
    actor_user_id: DbId,
) -> AppResult<ReservationDetail> {
    let status = changes
        .status
        .as_deref()
        .map(ReservationStatus::parse)
        .transpose()?;

    let existing = ReservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Reservation", id))?;

    let revalidate = state.config.booking.revalidate_admin_date_changes;
    let mut tx = state.pool.begin().await?;

    // CANCELLED/COMPLETED back to PENDING/CONFIRMED claims the dates again.
    let reclaims_dates = status.is_some_and(ReservationStatus::blocks_inventory)
        && !existing
            .status()
            .is_some_and(ReservationStatus::blocks_inventory);

    let mut total = changes.total_amount;
    if changes.moves_stay() || (revalidate && (changes.guests.is_some() || reclaims_dates)) {
        let room_id = changes.room_id.unwrap_or(existing.room_id);
        let stay = StayRange::new(
            changes.check_in.unwrap_or(existing.check_in),
            changes.check_out.unwrap_or(existing.check_out),
        )?;

        let room = RoomRepo::lock_for_booking(&mut tx, room_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Room", room_id))?;

        if revalidate {
            if !room.is_active {
                return Err(CoreError::Unavailable(MSG_ROOM_UNAVAILABLE.into()).into());
            }
            ensure_capacity(changes.guests.unwrap_or(existing.guests), room.capacity)?;

            let resulting = status.or_else(|| existing.status());
            if resulting.is_some_and(ReservationStatus::blocks_inventory) {
                let overlapping = ReservationRepo::has_overlap(
                    &mut *tx,
                    room.id,
                    stay.check_in(),
                    stay.check_out(),
                    Some(id),
                )
                .await?;
                if overlapping {
                    return Err(CoreError::BusinessRule(MSG_NOT_AVAILABLE.into()).into());
                }
            }
        }

        if changes.moves_stay() {
            total = Some(price_stay(&stay, room.base_price)?);
        }
    }

    let update = UpdateReservation {
        guest_first_name: changes.guest_first_name,
        guest_last_name: changes.guest_last_name,
        guest_email: changes.guest_email,
        guest_phone: changes.guest_phone,
        guest_street: changes.guest_street,
        guest_city: changes.guest_city,
        guest_state: changes.guest_state,
        guest_zip_code: changes.guest_zip_code,
        room_id: changes.room_id,
        check_in: changes.check_in,
        check_out: changes.check_out,
        guests: changes.guests,
        total_amount: total,
        status: status.map(|s| s.as_str().to_string()),
        special_requests: changes.special_requests,
    };

    let updated = ReservationRepo::update(&mut *tx, id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("Reservation", id))?;
    tx.commit().await?;

    tracing::info!(
        reservation_id = id,
        status = %updated.status,
        actor_user_id,
        "Reservation updated by staff"
    );

    Ok(ReservationRepo::with_room(&state.pool, updated).await?)
}

/// Hard delete.
pub async fn delete_reservation(state: &AppState, id: DbId, actor_user_id: DbId) -> AppResult<()> {
    if !ReservationRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("Reservation", id)));
    }
    tracing::info!(reservation_id = id, actor_user_id, "Reservation deleted");
    Ok(())
}
