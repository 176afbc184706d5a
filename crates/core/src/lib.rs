//! Lodge domain core.
//!
//! Pure booking logic with zero internal dependencies so it can be shared by
//! the repository layer, the HTTP API, and the notification service.

pub mod booking;
pub mod confirmation;
pub mod error;
pub mod reporting;
pub mod roles;
pub mod room;
pub mod types;
