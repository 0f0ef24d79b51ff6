//! Pure domain logic for the registration platform.
//!
//! Everything in this crate is I/O-free: the capacity decision function,
//! phone normalization, waitlist matching, form-schema validation,
//! capability tokens, and code generation. The persistence layer
//! (`rsvp-db`) applies these decisions inside its transactions.

pub mod capacity;
pub mod codes;
pub mod error;
pub mod form;
pub mod phone;
pub mod roles;
pub mod token;
pub mod types;
pub mod waitlist;
