//! JSON API behind the dashboard panel

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use queue_store::{Job, JobCounts, JobState, QueueHandle, QueueStoreError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{middleware::AuthenticatedSession, registry::QueueRegistry, types::AppError};

/// Number of jobs per page
pub const PAGE_SIZE: u32 = 10;

/// Counts and pause flag of one registered queue
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    /// Queue name
    pub name: String,
    /// Whether workers are currently kept from taking waiting jobs
    pub is_paused: bool,
    /// Number of jobs in each state
    pub counts: JobCounts,
}

/// Every registered queue, in registration order
#[derive(Debug, Serialize, JsonSchema)]
pub struct QueuesResponse {
    /// Queue summaries
    pub queues: Vec<QueueSummary>,
}

/// Queue named in the request path
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueuePath {
    /// Registered queue name
    pub queue: String,
}

/// Job named in the request path
#[derive(Debug, Deserialize, JsonSchema)]
pub struct JobPath {
    /// Registered queue name
    pub queue: String,
    /// Job id
    pub id: String,
}

/// Queue and state named in the request path
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CleanPath {
    /// Registered queue name
    pub queue: String,
    /// State to empty
    pub status: JobState,
}

/// Paging parameters of a job listing
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct JobsQuery {
    /// State to list, `waiting` when omitted
    pub status: Option<JobState>,
    /// 1-based page number, `1` when omitted
    pub page: Option<u32>,
}

/// One page of jobs in a state
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobsResponse {
    /// Listed state
    pub status: JobState,
    /// 1-based page number
    pub page: u32,
    /// Jobs per page
    pub page_size: u32,
    /// Number of jobs in the state
    pub total: u64,
    /// Jobs on this page
    pub jobs: Vec<Job>,
}

/// Outcome of a maintenance action
#[derive(Debug, Serialize, JsonSchema)]
pub struct ActionResponse {
    /// Number of jobs the action changed
    pub affected: u64,
}

fn lookup<'a>(registry: &'a QueueRegistry, name: &str) -> Result<&'a QueueHandle, AppError> {
    registry.get(name).ok_or_else(|| {
        tracing::debug!("Unknown queue requested: {name}");
        AppError::queue_not_found()
    })
}

/// Inclusive store index range of a 1-based page
fn page_range(page: u32) -> (isize, isize) {
    let start = i64::from(page.saturating_sub(1)) * i64::from(PAGE_SIZE);
    let end = start + i64::from(PAGE_SIZE) - 1;
    (
        isize::try_from(start).unwrap_or(isize::MAX),
        isize::try_from(end).unwrap_or(isize::MAX),
    )
}

/// List registered queues
///
/// Returns every queue with its job counts and whether it is paused.
///
/// # Errors
///
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn list_queues(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
) -> Result<Json<QueuesResponse>, AppError> {
    let mut queues = Vec::with_capacity(registry.len());

    for handle in registry.iter() {
        queues.push(QueueSummary {
            name: handle.name().to_string(),
            is_paused: handle.is_paused().await?,
            counts: handle.job_counts().await?,
        });
    }

    Ok(Json(QueuesResponse { queues }))
}

/// List jobs of a queue in one state
///
/// Pages hold up to ten jobs, newest first. Page `0` is treated as page `1`.
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn list_jobs(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(QueuePath { queue }): Path<QueuePath>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let handle = lookup(&registry, &queue)?;
    let status = query.status.unwrap_or(JobState::Waiting);
    let page = query.page.unwrap_or(1).max(1);
    let (start, end) = page_range(page);

    let total = handle.job_counts().await?.get(status);
    let jobs = handle.jobs(status, start, end).await?;

    Ok(Json(JobsResponse {
        status,
        page,
        page_size: PAGE_SIZE,
        total,
        jobs,
    }))
}

/// Get one job
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered or the job does not exist
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn get_job(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(JobPath { queue, id }): Path<JobPath>,
) -> Result<Json<Job>, AppError> {
    let handle = lookup(&registry, &queue)?;
    let job = handle
        .job(&id)
        .await?
        .ok_or(QueueStoreError::JobNotFound(id))?;

    Ok(Json(job))
}

/// Move a failed job back to waiting
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered or the job does not exist
/// - `409 CONFLICT` - The job is not failed
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn retry_job(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(JobPath { queue, id }): Path<JobPath>,
) -> Result<Json<ActionResponse>, AppError> {
    lookup(&registry, &queue)?.retry_job(&id).await?;
    tracing::info!(%queue, job_id = %id, "Retried job");

    Ok(Json(ActionResponse { affected: 1 }))
}

/// Move a delayed job to waiting right away
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered or the job does not exist
/// - `409 CONFLICT` - The job is not delayed
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn promote_job(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(JobPath { queue, id }): Path<JobPath>,
) -> Result<Json<ActionResponse>, AppError> {
    lookup(&registry, &queue)?.promote_job(&id).await?;
    tracing::info!(%queue, job_id = %id, "Promoted job");

    Ok(Json(ActionResponse { affected: 1 }))
}

/// Delete a job and its logs
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered or the job does not exist
/// - `409 CONFLICT` - A worker holds the job lock
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn remove_job(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(JobPath { queue, id }): Path<JobPath>,
) -> Result<Json<ActionResponse>, AppError> {
    lookup(&registry, &queue)?.remove_job(&id).await?;
    tracing::info!(%queue, job_id = %id, "Removed job");

    Ok(Json(ActionResponse { affected: 1 }))
}

/// Retry every failed job of a queue
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn retry_all(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(QueuePath { queue }): Path<QueuePath>,
) -> Result<Json<ActionResponse>, AppError> {
    let affected = lookup(&registry, &queue)?.retry_all_failed().await?;

    Ok(Json(ActionResponse { affected }))
}

/// Remove every job in one state
///
/// # Errors
///
/// - `400 BAD_REQUEST` - The state is `active`
/// - `404 NOT_FOUND` - The queue is not registered
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn clean(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(CleanPath { queue, status }): Path<CleanPath>,
) -> Result<Json<ActionResponse>, AppError> {
    let affected = lookup(&registry, &queue)?.clean(status).await?;

    Ok(Json(ActionResponse { affected }))
}

/// Pause a queue
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn pause(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(QueuePath { queue }): Path<QueuePath>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = lookup(&registry, &queue)?;
    let affected = handle.job_counts().await?.waiting;
    handle.pause().await?;

    Ok(Json(ActionResponse { affected }))
}

/// Resume a paused queue
///
/// # Errors
///
/// - `404 NOT_FOUND` - The queue is not registered
/// - `503 SERVICE_UNAVAILABLE` - The queue store cannot be reached
pub async fn resume(
    _session: AuthenticatedSession,
    Extension(registry): Extension<Arc<QueueRegistry>>,
    Path(QueuePath { queue }): Path<QueuePath>,
) -> Result<Json<ActionResponse>, AppError> {
    let handle = lookup(&registry, &queue)?;
    let affected = handle.job_counts().await?.paused;
    handle.resume().await?;

    Ok(Json(ActionResponse { affected }))
}
