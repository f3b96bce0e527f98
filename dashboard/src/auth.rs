//! Credential check for the single admin account

use crate::types::Config;

/// The only accepted username
pub const ADMIN_USERNAME: &str = "admin";

/// Value stored in every session created by a successful login
pub const SESSION_MARKER: &str = "bull-board";

/// Checks a login attempt against the configured password
///
/// This is a plain string comparison: no hashing, no constant-time
/// comparison and no attempt throttling.
#[must_use]
pub fn verify_credentials(config: &Config, username: &str, password: &str) -> bool {
    username == ADMIN_USERNAME && password == config.password
}
