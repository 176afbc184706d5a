//! Handlers for the `/rooms` resource.
//!
//! Browsing and availability are public; create, update, and deactivate
//! require [`RequireStaff`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lodge_core::booking::{validate_new_stay, StayRange};
use lodge_core::error::{CoreError, FieldError};
use lodge_core::room::{validate_room_fields, RoomCategory};
use lodge_core::types::{DbId, Money};
use lodge_db::models::room::{CreateRoom, Room, UpdateRoom};
use lodge_db::repositories::{ReservationRepo, RoomRepo};
use serde::{Deserialize, Serialize};

use crate::booking::today_utc;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireStaff;
use crate::query::parse_date;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /rooms/check-availability`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub room_id: Option<DbId>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Request body for `POST /rooms/available`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableRoomsRequest {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<i32>,
}

/// Request body for `POST /rooms`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub room_number: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub base_price: Option<Money>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateRoomRequest {
    fn into_dto(self) -> Result<CreateRoom, CoreError> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push(FieldError::new("name", "Room name is required"));
        }
        if self.room_number.is_none() {
            missing.push(FieldError::new("roomNumber", "Room number is required"));
        }
        if self.room_type.is_none() {
            missing.push(FieldError::new("type", "Room type is required"));
        }
        if self.capacity.is_none() {
            missing.push(FieldError::new("capacity", "Capacity is required"));
        }
        if self.base_price.is_none() {
            missing.push(FieldError::new("basePrice", "Base price is required"));
        }

        match (self.name, self.room_number, self.room_type, self.capacity, self.base_price) {
            (Some(name), Some(room_number), Some(room_type), Some(capacity), Some(base_price)) => {
                validate_room_fields(
                    Some(&name),
                    Some(&room_number),
                    Some(capacity),
                    Some(base_price),
                )?;
                Ok(CreateRoom {
                    name: name.trim().to_string(),
                    room_number: room_number.trim().to_string(),
                    room_type: RoomCategory::parse(&room_type)?.as_str().to_string(),
                    description: self.description,
                    capacity,
                    base_price,
                    amenities: self.amenities,
                    images: self.images,
                })
            }
            _ => Err(CoreError::InvalidFields(missing)),
        }
    }
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/rooms
///
/// Active rooms ordered by category, then price.
pub async fn list_rooms(State(state): State<AppState>) -> AppResult<Json<Vec<Room>>> {
    let rooms = RoomRepo::list_active(&state.pool).await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/{id}
///
/// Any room by id, including deactivated ones, so old reservations still
/// resolve their room.
pub async fn get_room(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Room>> {
    let room = RoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Room", id))?;
    Ok(Json(room))
}

/// POST /api/rooms/check-availability
///
/// Whether one room is free for a stay. Reserves nothing.
pub async fn check_availability(
    State(state): State<AppState>,
    AppJson(input): AppJson<AvailabilityRequest>,
) -> AppResult<Json<AvailabilityResponse>> {
    let check_in = parse_date("checkIn", input.check_in.as_deref())?;
    let check_out = parse_date("checkOut", input.check_out.as_deref())?;
    let (Some(room_id), Some(check_in), Some(check_out)) = (input.room_id, check_in, check_out)
    else {
        return Err(AppError::BadRequest(
            "Room ID, check-in, and check-out dates are required".into(),
        ));
    };

    let stay = validate_new_stay(check_in, check_out, today_utc())?;
    let taken = ReservationRepo::has_overlap(
        &state.pool,
        room_id,
        stay.check_in(),
        stay.check_out(),
        None,
    )
    .await?;

    Ok(Json(AvailabilityResponse { available: !taken }))
}

/// POST /api/rooms/available
///
/// Active rooms that fit the party and have no blocking reservation in the
/// requested window.
pub async fn available_rooms(
    State(state): State<AppState>,
    AppJson(input): AppJson<AvailableRoomsRequest>,
) -> AppResult<Json<Vec<Room>>> {
    let check_in = parse_date("checkIn", input.check_in.as_deref())?;
    let check_out = parse_date("checkOut", input.check_out.as_deref())?;
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return Err(AppError::BadRequest(
            "Check-in and check-out dates are required".into(),
        ));
    };

    let stay = StayRange::new(check_in, check_out)?;
    let min_capacity = input.guests.filter(|g| *g > 0);
    let rooms =
        RoomRepo::list_available(&state.pool, stay.check_in(), stay.check_out(), min_capacity)
            .await?;
    Ok(Json(rooms))
}

// ---------------------------------------------------------------------------
// Staff handlers
// ---------------------------------------------------------------------------

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    AppJson(input): AppJson<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<Room>)> {
    let dto = input.into_dto()?;
    let room = RoomRepo::create(&state.pool, &dto).await?;
    tracing::info!(room_id = room.id, room_number = %room.room_number, actor_user_id = staff.user_id, "Room created");
    Ok((StatusCode::CREATED, Json(room)))
}

/// PUT /api/rooms/{id}
pub async fn update_room(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    AppPath(id): AppPath<DbId>,
    AppJson(mut input): AppJson<UpdateRoom>,
) -> AppResult<Json<Room>> {
    validate_room_fields(
        input.name.as_deref(),
        input.room_number.as_deref(),
        input.capacity,
        input.base_price,
    )?;
    if let Some(raw) = input.room_type.as_deref() {
        input.room_type = Some(RoomCategory::parse(raw)?.as_str().to_string());
    }

    let room = RoomRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Room", id))?;
    tracing::info!(room_id = id, actor_user_id = staff.user_id, "Room updated");
    Ok(Json(room))
}

/// DELETE /api/rooms/{id}
///
/// Soft delete: the room leaves the public catalog, its reservations stay.
pub async fn delete_room(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !RoomRepo::deactivate(&state.pool, id).await? {
        return Err(CoreError::not_found("Room", id).into());
    }
    tracing::info!(room_id = id, actor_user_id = staff.user_id, "Room deactivated");
    Ok(Json(MessageResponse::new("Room deactivated successfully")))
}
