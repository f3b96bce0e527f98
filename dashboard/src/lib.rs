//! Password-protected dashboard for Bull job queues

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Admin credential check
pub mod auth;

/// Login gate middleware
pub mod middleware;

/// Queues registered with the dashboard
pub mod registry;

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// In-process login sessions
pub mod session;

/// Configuration, environment and error types
pub mod types;
