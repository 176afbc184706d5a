//! Shared response bodies for API handlers.
//!
//! Most endpoints return the entity itself. Mutations the client confirms to
//! the user also carry a human-readable `message`; those response types live
//! beside their handlers, and plain acknowledgements use [`MessageResponse`].

use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
