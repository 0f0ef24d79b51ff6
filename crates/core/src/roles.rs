//! Admin principal roles.
//!
//! Roles arrive already authenticated (JWT claims); the core only decides
//! what each role may touch. `SUPER_ADMIN` bypasses school scoping.

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_OWNER: &str = "OWNER";
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";

/// Whether a role is confined to its own school's resources.
pub fn is_school_scoped(role: &str) -> bool {
    role != ROLE_SUPER_ADMIN
}
