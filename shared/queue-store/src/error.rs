use thiserror::Error;

use crate::types::JobState;

/// Result type alias for queue store operations
pub type QueueStoreResult<T> = Result<T, QueueStoreError>;

/// Error types for queue store operations
#[derive(Error, Debug)]
pub enum QueueStoreError {
    /// The store connection URL could not be built
    #[error("Invalid store connection parameters: {0}")]
    InvalidConnection(String),

    /// Connecting to or talking to Redis failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A store round trip exceeded the configured timeout
    #[error("Redis timeout")]
    Timeout,

    /// The job hash does not exist
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job exists but is not in the state the operation requires
    #[error("Job {id} is not in state {expected}")]
    InvalidJobState {
        /// Job id
        id: String,
        /// State the operation required
        expected: JobState,
    },

    /// The job is locked by a worker and cannot be modified
    #[error("Job {0} is locked by a worker")]
    JobLocked(String),

    /// The operation does not apply to the given state
    #[error("Operation not supported for state {0}")]
    UnsupportedState(JobState),
}
