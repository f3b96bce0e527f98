//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use queue_store::QueueStoreError;
use schemars::JsonSchema;
use serde::Serialize;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// Error for a queue name that is not registered with the dashboard
    #[must_use]
    pub const fn queue_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "queue_not_found",
            "Queue is not registered with this dashboard",
            false,
        )
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;
}

/// Convert queue store errors to application errors
impl From<QueueStoreError> for AppError {
    fn from(err: QueueStoreError) -> Self {
        use QueueStoreError::{
            InvalidConnection, InvalidJobState, JobLocked, JobNotFound, Redis, Timeout,
            UnsupportedState,
        };

        match &err {
            JobNotFound(id) => {
                tracing::debug!("Job not found: {id}");
                Self::new(StatusCode::NOT_FOUND, "job_not_found", "Job not found", false)
            }
            InvalidJobState { id, expected } => {
                tracing::debug!("Job {id} is not {expected}");
                Self::new(
                    StatusCode::CONFLICT,
                    "invalid_job_state",
                    "Job is not in a state that allows this action",
                    false,
                )
            }
            JobLocked(id) => {
                tracing::debug!("Job {id} is locked by a worker");
                Self::new(
                    StatusCode::CONFLICT,
                    "job_locked",
                    "Job is being processed by a worker",
                    true,
                )
            }
            UnsupportedState(state) => {
                tracing::debug!("Unsupported state for action: {state}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "unsupported_state",
                    "Action is not supported for this job state",
                    false,
                )
            }
            Redis(_) | Timeout | InvalidConnection(_) => {
                tracing::error!("Queue store error: {err}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "Queue store temporarily unavailable",
                    true,
                )
            }
        }
    }
}
