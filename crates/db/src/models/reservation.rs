use chrono::NaiveDate;
use lodge_core::booking::{ReservationStatus, StayRange};
use lodge_core::reporting::StayFigures;
use lodge_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::room::Room;

/// A row from the `reservations` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: DbId,
    pub confirmation_code: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub guest_street: Option<String>,
    pub guest_city: Option<String>,
    pub guest_state: Option<String>,
    pub guest_zip_code: Option<String>,
    pub room_id: DbId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_amount: Money,
    pub status: String,
    pub special_requests: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    /// The stay interval. `None` only if the row somehow violates
    /// `chk_reservations_dates`.
    pub fn stay(&self) -> Option<StayRange> {
        StayRange::new(self.check_in, self.check_out).ok()
    }

    /// Parsed status. Unknown text is impossible under
    /// `chk_reservations_status`.
    pub fn status(&self) -> Option<ReservationStatus> {
        ReservationStatus::parse(&self.status).ok()
    }

    pub fn figures(&self) -> Option<StayFigures> {
        Some(StayFigures {
            status: self.status()?,
            nights: self.stay()?.nights(),
            total: self.total_amount,
        })
    }
}

/// A reservation with its room embedded, the shape every endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub room: Room,
}

/// DTO for inserting a reservation. Status always starts at `PENDING`.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub confirmation_code: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub guest_street: Option<String>,
    pub guest_city: Option<String>,
    pub guest_state: Option<String>,
    pub guest_zip_code: Option<String>,
    pub room_id: DbId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub total_amount: Money,
    pub special_requests: String,
}

/// Partial reservation update. Only `Some` fields are applied.
///
/// `status` must already be a canonical uppercase name.
#[derive(Debug, Clone, Default)]
pub struct UpdateReservation {
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
    pub total_amount: Option<Money>,
    pub status: Option<String>,
    pub special_requests: Option<String>,
}

/// Optional list filters. Date bounds apply to `check_in`, inclusive.
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub room_id: Option<DbId>,
    pub room_type: Option<String>,
}
