/// Session cookie gate for the protected route tree
pub mod auth;

pub use auth::{ensure_logged_in, load_session, AuthenticatedSession, SESSION_COOKIE};
