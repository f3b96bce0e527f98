//! Liveness endpoint

use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::registry::QueueRegistry;

/// Process liveness, build and registration details
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub semver: &'static str,
    /// Commit the binary was built from, when `GIT_REV` was set at build time
    pub rev: Option<&'static str>,
    /// Names of the registered queues
    pub queues: Vec<String>,
}

/// Reports that the process is up and which queues it serves
///
/// Answers without a session and without contacting the queue store.
#[allow(clippy::unused_async)]
pub async fn handler(Extension(registry): Extension<Arc<QueueRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        semver: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
        queues: registry.names().into_iter().map(str::to_string).collect(),
    })
}
