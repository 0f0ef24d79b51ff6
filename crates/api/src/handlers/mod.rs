//! Request handlers, grouped by resource.

pub mod bans;
pub mod cancel;
pub mod check_in;
pub mod events;
pub mod register;
pub mod registrations;
pub mod repair;
pub mod tables;
pub mod waitlist;
