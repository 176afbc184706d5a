//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Request handlers publish [`BookingEvent`]s and move on; publishing never
//! blocks and never fails the request. Shared via `Arc<EventBus>`.

use chrono::{DateTime, NaiveDate, Utc};
use lodge_core::types::{DbId, Money};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const RESERVATION_CREATED: &str = "reservation.created";
pub const RESERVATION_CANCELLED: &str = "reservation.cancelled";

// ---------------------------------------------------------------------------
// BookingEvent
// ---------------------------------------------------------------------------

/// Snapshot of a reservation taken at publish time, carrying everything the
/// guest emails need so the dispatcher never reads the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationNotice {
    pub confirmation_code: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: i32,
    pub total_amount: Money,
    pub special_requests: String,
}

/// A reservation lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Dot-separated event name, e.g. `"reservation.created"`.
    pub event_type: String,
    pub reservation_id: DbId,
    pub notice: ReservationNotice,
    pub timestamp: DateTime<Utc>,
}

impl BookingEvent {
    pub fn new(event_type: impl Into<String>, reservation_id: DbId, notice: ReservationNotice) -> Self {
        Self {
            event_type: event_type.into(),
            reservation_id,
            notice,
            timestamp: Utc::now(),
        }
    }

    pub fn created(reservation_id: DbId, notice: ReservationNotice) -> Self {
        Self::new(RESERVATION_CREATED, reservation_id, notice)
    }

    pub fn cancelled(reservation_id: DbId, notice: ReservationNotice) -> Self {
        Self::new(RESERVATION_CANCELLED, reservation_id, notice)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// ```rust
/// use lodge_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let _rx = bus.subscribe();
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BookingEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: BookingEvent) {
        // A SendError only means there are zero receivers.
        if self.sender.send(event).is_err() {
            tracing::debug!("Booking event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
