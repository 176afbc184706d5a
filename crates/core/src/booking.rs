//! Reservation rules: stay ranges, the overlap predicate, pricing, status
//! lifecycle, and the guest cancellation window.
//!
//! A stay occupies the half-open interval `[check_in, check_out)`: the guest
//! sleeps every night from `check_in` up to but excluding `check_out`, so a
//! checkout on the 12th and a check-in on the 12th never collide.

use std::fmt;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{max_money, start_of_day, Money, Timestamp};

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

pub const MSG_MISSING_FIELDS: &str = "Missing required fields";
pub const MSG_INVALID_RANGE: &str = "Check-out date must be after check-in date";
pub const MSG_PAST_CHECK_IN: &str = "Check-in date cannot be in the past";
pub const MSG_ROOM_UNAVAILABLE: &str = "Room not found or not available";
pub const MSG_CAPACITY_EXCEEDED: &str = "Number of guests exceeds room capacity";
pub const MSG_NOT_AVAILABLE: &str = "Room is not available for the selected dates";
pub const MSG_TOTAL_TOO_LARGE: &str = "Total amount exceeds the maximum for a single reservation";
pub const MSG_GUEST_CANCEL_ONLY: &str = "Guests can only cancel reservations";
pub const MSG_ALREADY_CANCELLED: &str = "Reservation is already cancelled";
pub const MSG_CANNOT_CANCEL_COMPLETED: &str = "Cannot cancel completed reservation";
pub const MSG_CANCEL_WINDOW: &str =
    "Cancellation not allowed within 24 hours of check-in. Please call the lodge.";

/// Default minimum lead time, in hours, for guest self-service cancellation.
pub const DEFAULT_CANCELLATION_LEAD_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Reservation lifecycle status. Stored and serialized in uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
        Self::NoShow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// Parse a status from user input, normalizing case and separators
    /// (`"no-show"`, `"No Show"` and `"NO_SHOW"` are all accepted).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == normalized)
            .ok_or_else(|| CoreError::Validation(format!("Unknown reservation status '{raw}'")))
    }

    /// Whether a reservation in this status holds the room for its dates.
    pub fn blocks_inventory(self) -> bool {
        BLOCKING_STATUSES.contains(&self)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses that occupy a room and take part in overlap checks.
pub const BLOCKING_STATUSES: [ReservationStatus; 2] =
    [ReservationStatus::Pending, ReservationStatus::Confirmed];

/// Statuses counted as earned revenue.
pub const REVENUE_STATUSES: [ReservationStatus; 2] =
    [ReservationStatus::Confirmed, ReservationStatus::Completed];

/// Statuses shown on the staff calendar.
pub const CALENDAR_STATUSES: [ReservationStatus; 3] = [
    ReservationStatus::Pending,
    ReservationStatus::Confirmed,
    ReservationStatus::Completed,
];

/// String forms of a status set, for binding as a SQL `TEXT[]`.
pub fn status_names(statuses: &[ReservationStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Stay range
// ---------------------------------------------------------------------------

/// A validated half-open date interval `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting `check_out <= check_in`.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, CoreError> {
        if check_in >= check_out {
            return Err(CoreError::BusinessRule(MSG_INVALID_RANGE.into()));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Half-open overlap: `[a, b)` and `[c, d)` overlap iff `a < d && c < b`.
    ///
    /// Mirrors the SQL predicate `check_in < $new_out AND check_out > $new_in`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Number of nights in the stay. Always at least 1.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Whether the guest occupies the room on the night of `day`.
    pub fn occupies(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day < self.check_out
    }
}

/// Validate the date part of a new booking: range first, then the
/// no-past-check-in rule against `today` (UTC calendar date).
pub fn validate_new_stay(
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> Result<StayRange, CoreError> {
    let stay = StayRange::new(check_in, check_out)?;
    if stay.check_in < today {
        return Err(CoreError::BusinessRule(MSG_PAST_CHECK_IN.into()));
    }
    Ok(stay)
}

/// Reject a party larger than the room sleeps.
pub fn ensure_capacity(guests: i32, capacity: i32) -> Result<(), CoreError> {
    if guests > capacity {
        return Err(CoreError::BusinessRule(MSG_CAPACITY_EXCEEDED.into()));
    }
    Ok(())
}

/// Parse a stay date from either `YYYY-MM-DD` or an RFC 3339 timestamp
/// (whose UTC calendar date is used).
pub fn parse_stay_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Total price of a stay: nights x nightly rate, in exact decimal arithmetic.
pub fn total_amount(stay: &StayRange, nightly_rate: Money) -> Money {
    (Decimal::from(stay.nights()) * nightly_rate).round_dp(2)
}

/// [`total_amount`], rejected when it does not fit the stored column.
pub fn price_stay(stay: &StayRange, nightly_rate: Money) -> Result<Money, CoreError> {
    let total = total_amount(stay, nightly_rate);
    if total > max_money() {
        return Err(CoreError::BusinessRule(MSG_TOTAL_TOO_LARGE.into()));
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Cancellation policy
// ---------------------------------------------------------------------------

/// The instant a stay begins for lead-time purposes: midnight UTC of the
/// check-in date.
pub fn check_in_instant(check_in: NaiveDate) -> Timestamp {
    start_of_day(check_in)
}

/// Guest self-service cancellation rules.
///
/// Rejects already-cancelled and completed reservations, then anything whose
/// check-in instant is less than `lead_hours` away from `now`.
pub fn ensure_guest_cancellable(
    status: ReservationStatus,
    check_in: NaiveDate,
    now: Timestamp,
    lead_hours: i64,
) -> Result<(), CoreError> {
    match status {
        ReservationStatus::Cancelled => {
            return Err(CoreError::BusinessRule(MSG_ALREADY_CANCELLED.into()))
        }
        ReservationStatus::Completed => {
            return Err(CoreError::BusinessRule(MSG_CANNOT_CANCEL_COMPLETED.into()))
        }
        _ => {}
    }

    let lead = check_in_instant(check_in) - now;
    if lead < chrono::Duration::hours(lead_hours) {
        return Err(CoreError::BusinessRule(MSG_CANCEL_WINDOW.into()));
    }
    Ok(())
}

/// Guests may only ask for the literal status `"cancelled"`.
pub fn ensure_guest_cancel_request(requested: Option<&str>) -> Result<(), CoreError> {
    match requested {
        Some("cancelled") => Ok(()),
        _ => Err(CoreError::Validation(MSG_GUEST_CANCEL_ONLY.into())),
    }
}
