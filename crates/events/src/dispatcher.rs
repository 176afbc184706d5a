//! Guest notification dispatcher.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus),
//! renders an email for each booking event, and delivers it through a
//! [`Mailer`] with exponential-backoff retries. Failures are logged and
//! dropped; they never reach the request that published the event. The loop
//! ends once every bus sender is gone.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::BookingEvent;
use crate::delivery::email::{EmailError, Mailer, OutgoingEmail};
use crate::templates;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Retry policy for email delivery.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Total send attempts per email, including the first. At least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further retry.
    pub base_backoff: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
        }
    }
}

impl DispatchConfig {
    /// Read `EMAIL_MAX_ATTEMPTS` (default 3).
    pub fn from_env() -> Self {
        let max_attempts = std::env::var("EMAIL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    fn backoff_for(&self, retry: u32) -> Duration {
        self.base_backoff.saturating_mul(2_u32.saturating_pow(retry))
    }
}

pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, config: DispatchConfig) -> Self {
        Self { mailer, config }
    }

    /// Consume events until the bus closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<BookingEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged, guest emails skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Render and deliver the email for one event, logging the outcome.
    pub async fn handle(&self, event: &BookingEvent) {
        let Some(email) = templates::render(&event.event_type, &event.notice) else {
            tracing::debug!(event_type = %event.event_type, "No guest email for event");
            return;
        };

        if let Err(e) = self.deliver(&email).await {
            tracing::error!(
                error = %e,
                event_type = %event.event_type,
                reservation_id = event.reservation_id,
                attempts = self.config.max_attempts,
                "Guest email delivery failed, giving up"
            );
        }
    }

    /// Send with retries. Returns the last error once attempts run out.
    pub async fn deliver(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.mailer.send(email).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    let delay = self.config.backoff_for(attempt - 1);
                    tracing::warn!(
                        error = %e,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        to = %email.to,
                        "Guest email send failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
