//! Handlers for the `/reservations` resource.
//!
//! Guests create reservations and look up or cancel them by confirmation
//! code without logging in. Everything keyed by id, plus the stats rollup,
//! requires [`RequireStaff`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use lodge_core::booking::MSG_MISSING_FIELDS;
use lodge_core::error::{CoreError, FieldError};
use lodge_core::reporting::{month_containing, percentage};
use lodge_core::types::{max_money, DbId, Money};
use lodge_db::models::reservation::ReservationDetail;
use lodge_db::repositories::{ReportRepo, ReservationRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::booking::{self, today_utc, BookingRequest, GuestDetails, ReservationChanges};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireStaff;
use crate::query::ReservationListParams;
use crate::response::MessageResponse;
use crate::state::AppState;
use crate::validation::{field_errors, validate_phone};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /reservations`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub room_id: Option<DbId>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[validate(range(min = 1, max = 8, message = "Number of guests must be between 1 and 8"))]
    pub guests: Option<i32>,
    pub guest_info: Option<GuestInfoRequest>,
    #[validate(length(max = 500, message = "Special requests must be less than 500 characters"))]
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestInfoRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "First name is required and must be less than 50 characters"
    ))]
    pub first_name: Option<String>,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name is required and must be less than 50 characters"
    ))]
    pub last_name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[validate(custom(function = validate_phone, message = "Valid phone number is required"))]
    pub phone: Option<String>,
    pub address: Option<AddressRequest>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[validate(length(max = 200, message = "Street must be less than 200 characters"))]
    pub street: Option<String>,
    #[validate(length(max = 100, message = "City must be less than 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State must be less than 100 characters"))]
    pub state: Option<String>,
    #[validate(length(max = 20, message = "Zip code must be less than 20 characters"))]
    pub zip_code: Option<String>,
}

impl CreateReservationRequest {
    /// Presence check, then field formats, then date syntax.
    pub fn into_booking(self) -> Result<BookingRequest, CoreError> {
        let guest_present = self.guest_info.as_ref().is_some_and(|g| {
            present(&g.first_name) && present(&g.last_name) && present(&g.email) && present(&g.phone)
        });
        if self.room_id.is_none()
            || !present(&self.check_in)
            || !present(&self.check_out)
            || matches!(self.guests, None | Some(0))
            || !guest_present
        {
            return Err(CoreError::Validation(MSG_MISSING_FIELDS.into()));
        }

        let mut errors = Vec::new();
        if let Err(e) = self.validate() {
            errors.extend(field_errors(&e, None));
        }
        if let Some(guest) = &self.guest_info {
            if let Err(e) = guest.validate() {
                errors.extend(field_errors(&e, Some("guestInfo")));
            }
            if let Some(address) = &guest.address {
                if let Err(e) = address.validate() {
                    errors.extend(field_errors(&e, Some("guestInfo.address")));
                }
            }
        }

        let check_in = parse_body_date("checkIn", self.check_in.as_deref(), &mut errors);
        let check_out = parse_body_date("checkOut", self.check_out.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(CoreError::InvalidFields(errors));
        }

        let (Some(room_id), Some(check_in), Some(check_out), Some(guests), Some(info)) = (
            self.room_id,
            check_in,
            check_out,
            self.guests,
            self.guest_info,
        ) else {
            return Err(CoreError::Validation(MSG_MISSING_FIELDS.into()));
        };
        let address = info.address.unwrap_or_default();

        Ok(BookingRequest {
            room_id,
            check_in,
            check_out,
            guests,
            guest: GuestDetails {
                first_name: trimmed(info.first_name),
                last_name: trimmed(info.last_name),
                email: trimmed(info.email),
                phone: trimmed(info.phone),
                street: address.street,
                city: address.city,
                state: address.state,
                zip_code: address.zip_code,
            },
            special_requests: self.special_requests.map(|s| s.trim().to_string()).unwrap_or_default(),
        })
    }
}

/// Request body for `PATCH /reservations/confirmation/{code}`.
#[derive(Debug, Deserialize)]
pub struct GuestStatusRequest {
    pub status: Option<String>,
}

/// Request body for `PUT /reservations/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub guest_first_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub guest_last_name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub guest_email: Option<String>,
    #[validate(custom(function = validate_phone, message = "Valid phone number is required"))]
    pub guest_phone: Option<String>,
    pub guest_street: Option<String>,
    pub guest_city: Option<String>,
    pub guest_state: Option<String>,
    pub guest_zip_code: Option<String>,
    pub room_id: Option<DbId>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[validate(range(min = 1, message = "Number of guests must be at least 1"))]
    pub guests: Option<i32>,
    pub total_amount: Option<Money>,
    pub status: Option<String>,
    #[validate(length(max = 500, message = "Special requests must be less than 500 characters"))]
    pub special_requests: Option<String>,
}

impl UpdateReservationRequest {
    pub fn into_changes(self) -> Result<ReservationChanges, CoreError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e, None),
        };
        let check_in = parse_body_date("checkIn", self.check_in.as_deref(), &mut errors);
        let check_out = parse_body_date("checkOut", self.check_out.as_deref(), &mut errors);
        if self
            .total_amount
            .is_some_and(|t| t < Money::ZERO || t > max_money())
        {
            errors.push(FieldError::new(
                "totalAmount",
                format!("Total amount must be between 0 and {}", max_money()),
            ));
        }
        if !errors.is_empty() {
            return Err(CoreError::InvalidFields(errors));
        }

        Ok(ReservationChanges {
            guest_first_name: self.guest_first_name,
            guest_last_name: self.guest_last_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            guest_street: self.guest_street,
            guest_city: self.guest_city,
            guest_state: self.guest_state,
            guest_zip_code: self.guest_zip_code,
            room_id: self.room_id,
            check_in,
            check_out,
            guests: self.guests,
            total_amount: self.total_amount,
            status: self.status.filter(|s| !s.trim().is_empty()),
            special_requests: self.special_requests,
        })
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Parse an optional date field, recording a field error when it is present
/// but unparseable.
fn parse_body_date(field: &str, raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = lodge_core::booking::parse_stay_date(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(field, "Valid date is required (YYYY-MM-DD)"));
    }
    parsed
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreatedResponse {
    pub message: &'static str,
    pub reservation: ReservationDetail,
    pub confirmation_number: String,
}

#[derive(Debug, Serialize)]
pub struct ReservationMessageResponse {
    pub message: &'static str,
    pub reservation: ReservationDetail,
}

/// Body of `GET /reservations/admin/stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStats {
    pub total_reservations: i64,
    pub monthly_reservations: i64,
    pub confirmed_reservations: i64,
    pub total_revenue: Money,
    pub monthly_revenue: Money,
    /// Active rooms.
    pub total_rooms: i64,
    pub occupancy_rate: f64,
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationCreatedResponse>)> {
    let request = input.into_booking()?;
    let detail = booking::create_reservation(&state, request, today_utc()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreatedResponse {
            message: "Reservation created successfully",
            confirmation_number: detail.reservation.confirmation_code.clone(),
            reservation: detail,
        }),
    ))
}

/// GET /api/reservations/confirmation/{code}
pub async fn get_by_confirmation(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> AppResult<Json<ReservationDetail>> {
    let reservation = ReservationRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Reservation",
            key: code.clone(),
        })?;
    Ok(Json(ReservationRepo::with_room(&state.pool, reservation).await?))
}

/// PATCH /api/reservations/confirmation/{code}
///
/// Guest self-cancellation. The body must be `{ "status": "cancelled" }`.
pub async fn cancel_by_confirmation(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
    AppJson(input): AppJson<GuestStatusRequest>,
) -> AppResult<Json<ReservationMessageResponse>> {
    let detail =
        booking::cancel_by_code(&state, &code, input.status.as_deref(), Utc::now()).await?;
    Ok(Json(ReservationMessageResponse {
        message: "Reservation cancelled successfully",
        reservation: detail,
    }))
}

// ---------------------------------------------------------------------------
// Staff handlers
// ---------------------------------------------------------------------------

/// GET /api/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    AppQuery(params): AppQuery<ReservationListParams>,
) -> AppResult<Json<Vec<ReservationDetail>>> {
    let filter = params.to_filter()?;
    let reservations = ReservationRepo::list(&state.pool, &filter).await?;
    Ok(Json(ReservationRepo::with_rooms(&state.pool, reservations).await?))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ReservationDetail>> {
    let reservation = ReservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Reservation", id))?;
    Ok(Json(ReservationRepo::with_room(&state.pool, reservation).await?))
}

/// PUT /api/reservations/{id}
pub async fn update_reservation(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateReservationRequest>,
) -> AppResult<Json<ReservationDetail>> {
    let changes = input.into_changes()?;
    let detail = booking::update_reservation(&state, id, changes, staff.user_id).await?;
    Ok(Json(detail))
}

/// DELETE /api/reservations/{id}
pub async fn delete_reservation(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    booking::delete_reservation(&state, id, staff.user_id).await?;
    Ok(Json(MessageResponse::new("Reservation deleted successfully")))
}

/// GET /api/reservations/admin/stats
pub async fn reservation_stats(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> AppResult<Json<ReservationStats>> {
    let (start, next) = month_containing(today_utc());
    let row = ReportRepo::reservation_stats(&state.pool, start, next).await?;

    Ok(Json(ReservationStats {
        total_reservations: row.total_reservations,
        monthly_reservations: row.monthly_reservations,
        confirmed_reservations: row.confirmed_reservations,
        total_revenue: row.total_revenue,
        monthly_revenue: row.monthly_revenue,
        total_rooms: row.active_rooms,
        occupancy_rate: percentage(row.confirmed_reservations, row.active_rooms),
    }))
}
