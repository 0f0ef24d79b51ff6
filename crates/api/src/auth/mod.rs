//! JWT handling for admin principals.
//!
//! Authentication itself (login, sessions, password handling) is an
//! external collaborator; this module only validates the tokens it
//! issues and exposes the claims to handlers.

pub mod jwt;
