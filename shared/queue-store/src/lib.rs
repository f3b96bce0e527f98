//! Redis-backed queue store access for the queue dashboard
//!
//! Reads and maintains queues laid out the way the Bull job queue library
//! stores them: one list or sorted set of job ids per state and one hash per
//! job record.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Shared lazy Redis connection
pub mod client;
/// Store connection parameters
pub mod config;
/// Error types for queue store operations
pub mod error;
/// Handle bound to one named queue
pub mod handle;
mod scripts;
/// Job read model and job states
pub mod types;

pub use client::RedisClient;
pub use config::StoreConfig;
pub use error::{QueueStoreError, QueueStoreResult};
pub use handle::QueueHandle;
pub use types::{Job, JobCounts, JobState};
