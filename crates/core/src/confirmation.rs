//! Confirmation code generation.
//!
//! Codes are the prefix followed by ten time-derived digits. The generator
//! hands out strictly increasing values, so codes issued by one process never
//! repeat even when many are requested within the same millisecond. Across
//! processes the database unique constraint is the backstop.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

pub const CONFIRMATION_PREFIX: &str = "MB";

const DIGITS_MODULUS: i64 = 10_000_000_000;

/// Monotonic source of confirmation codes. One instance lives in app state.
#[derive(Debug, Default)]
pub struct ConfirmationCodeGenerator {
    last: AtomicI64,
}

impl ConfirmationCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a code based on the current wall clock.
    pub fn next_code(&self) -> String {
        self.next_code_at(Utc::now().timestamp_millis())
    }

    /// Issue a code for the given clock reading in milliseconds.
    ///
    /// The issued value is `max(now_millis, last + 1)`.
    pub fn next_code_at(&self, now_millis: i64) -> String {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format_code(candidate),
                Err(observed) => current = observed,
            }
        }
    }
}

fn format_code(value: i64) -> String {
    format!("{CONFIRMATION_PREFIX}{:010}", value.rem_euclid(DIGITS_MODULUS))
}
