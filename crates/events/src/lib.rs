//! Registration event bus and background services.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. The allocation handlers publish
//!   confirmed/waitlisted/cancelled events here; delivery (email, SMS,
//!   webhooks) is a subscriber's concern, never the core's.
//! - [`BanSweeper`] — periodic service that expires date-based bans and
//!   counts ended events against game-count bans.

pub mod bus;
pub mod sweeper;

pub use bus::{EventBus, RegistrationEvent, RegistrationEventKind};
pub use sweeper::BanSweeper;
