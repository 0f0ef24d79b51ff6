use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rsvp_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registration lifecycle event bus (notification subscribers hang
    /// off this).
    pub event_bus: Arc<rsvp_events::EventBus>,
}
