use std::sync::Arc;

use lodge_core::confirmation::ConfirmationCodeGenerator;
use lodge_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and everything else sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lodge_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Outbound queue for reservation events (guest emails).
    pub event_bus: Arc<EventBus>,
    pub confirmation_codes: Arc<ConfirmationCodeGenerator>,
}

impl AppState {
    pub fn new(pool: lodge_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            confirmation_codes: Arc::new(ConfirmationCodeGenerator::new()),
        }
    }
}
