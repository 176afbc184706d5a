//! Booking event bus and guest notification delivery.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BookingEvent`]: the reservation lifecycle event envelope.
//! - [`NotificationDispatcher`]: background task that turns booking events
//!   into guest emails and retries failed deliveries.
//! - [`delivery`]: the [`Mailer`] seam with SMTP and log-only implementations.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod templates;

pub use bus::{BookingEvent, EventBus, ReservationNotice};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use dispatcher::{DispatchConfig, NotificationDispatcher};
