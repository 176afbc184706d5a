//! Outbound delivery channels for guest notifications.

pub mod email;
