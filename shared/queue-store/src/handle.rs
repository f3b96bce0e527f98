use std::collections::HashMap;

use redis::{AsyncCommands, ScriptInvocation};

use crate::{
    client::RedisClient,
    config::StoreConfig,
    error::{QueueStoreError, QueueStoreResult},
    scripts::{self, CLEAN_STATE, MOVE_TO_WAIT, REMOVE_JOB, SET_PAUSED},
    types::{Job, JobCounts, JobState, StateStorage},
};

/// In-process reference to one named queue in the store
///
/// Cheap to clone; every handle built from the same `RedisClient` shares
/// its connection.
#[derive(Clone)]
pub struct QueueHandle {
    name: String,
    prefix: String,
    client: RedisClient,
}

impl std::fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandle")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl QueueHandle {
    /// Binds a handle to `name` under the configured key prefix
    ///
    /// Does not contact the store; connection errors surface from the
    /// first operation that needs the store.
    #[must_use]
    pub fn new(name: impl Into<String>, config: &StoreConfig, client: RedisClient) -> Self {
        Self {
            name: name.into(),
            prefix: config.key_prefix().to_string(),
            client,
        }
    }

    /// Queue name as configured
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully prefixed store key for `suffix`, e.g. `bull:emails:wait`
    #[must_use]
    pub fn key(&self, suffix: &str) -> String {
        format!("{}:{}:{suffix}", self.prefix, self.name)
    }

    fn state_key(&self, state: JobState) -> String {
        self.key(state.key_suffix())
    }

    /// Counts jobs in every state in a single round trip
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn job_counts(&self) -> QueueStoreResult<JobCounts> {
        let mut conn = self.client.conn().await?;
        let (waiting, active, completed, failed, delayed, paused): (u64, u64, u64, u64, u64, u64) =
            self.client
                .with_timeout(
                    redis::pipe()
                        .llen(self.state_key(JobState::Waiting))
                        .llen(self.state_key(JobState::Active))
                        .zcard(self.state_key(JobState::Completed))
                        .zcard(self.state_key(JobState::Failed))
                        .zcard(self.state_key(JobState::Delayed))
                        .llen(self.state_key(JobState::Paused))
                        .query_async(&mut conn),
                )
                .await?;

        Ok(JobCounts {
            waiting,
            active,
            completed,
            failed,
            delayed,
            paused,
        })
    }

    /// Whether the queue is paused
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn is_paused(&self) -> QueueStoreResult<bool> {
        let mut conn = self.client.conn().await?;
        self.client
            .with_timeout(conn.exists(self.key("meta-paused")))
            .await
    }

    /// Jobs in `state` between the inclusive indexes `start` and `end`
    ///
    /// Lists are read from the head (newest first), sorted sets from the
    /// highest score. Ids whose hash has already been removed are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn jobs(
        &self,
        state: JobState,
        start: isize,
        end: isize,
    ) -> QueueStoreResult<Vec<Job>> {
        let mut conn = self.client.conn().await?;
        let key = self.state_key(state);

        let ids: Vec<String> = match state.storage() {
            StateStorage::List => {
                self.client
                    .with_timeout(conn.lrange(&key, start, end))
                    .await?
            }
            StateStorage::SortedSet => {
                self.client
                    .with_timeout(conn.zrevrange(&key, start, end))
                    .await?
            }
        };

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.key(id));
        }
        let hashes: Vec<HashMap<String, String>> =
            self.client.with_timeout(pipe.query_async(&mut conn)).await?;

        Ok(ids
            .into_iter()
            .zip(hashes)
            .filter_map(|(id, fields)| Job::from_hash(id, &fields))
            .collect())
    }

    /// A single job by id, `None` if its hash does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn job(&self, id: &str) -> QueueStoreResult<Option<Job>> {
        let mut conn = self.client.conn().await?;
        let fields: HashMap<String, String> =
            self.client.with_timeout(conn.hgetall(self.key(id))).await?;

        Ok(Job::from_hash(id, &fields))
    }

    /// Moves a failed job back to waiting, or to paused if the queue is paused
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` for unknown ids, `InvalidJobState` if the job is not failed,
    /// or a store error
    pub async fn retry_job(&self, id: &str) -> QueueStoreResult<()> {
        self.move_to_wait(id, JobState::Failed, "retry").await
    }

    /// Retries every failed job, returning how many were moved
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn retry_all_failed(&self) -> QueueStoreResult<u64> {
        let mut conn = self.client.conn().await?;
        let ids: Vec<String> = self
            .client
            .with_timeout(conn.zrange(self.state_key(JobState::Failed), 0, -1))
            .await?;

        let mut retried = 0;
        for id in ids {
            match self.retry_job(&id).await {
                Ok(()) => retried += 1,
                // Picked up or removed by someone else in the meantime
                Err(QueueStoreError::JobNotFound(_) | QueueStoreError::InvalidJobState { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(queue = %self.name, retried, "Retried failed jobs");
        Ok(retried)
    }

    /// Moves a delayed job to waiting right away
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` for unknown ids, `InvalidJobState` if the job is not delayed,
    /// or a store error
    pub async fn promote_job(&self, id: &str) -> QueueStoreResult<()> {
        self.move_to_wait(id, JobState::Delayed, "promote").await
    }

    async fn move_to_wait(&self, id: &str, from: JobState, mode: &str) -> QueueStoreResult<()> {
        let code = self
            .run_script(
                MOVE_TO_WAIT
                    .key(self.state_key(from))
                    .key(self.state_key(JobState::Waiting))
                    .key(self.state_key(JobState::Paused))
                    .key(self.key("meta-paused"))
                    .key(self.key(id))
                    .arg(id)
                    .arg(mode),
            )
            .await?;

        check_code(code, id, from)
    }

    /// Removes a job from every state together with its hash and logs
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` for unknown ids, `JobLocked` while a worker holds the job,
    /// or a store error
    pub async fn remove_job(&self, id: &str) -> QueueStoreResult<()> {
        let job_key = self.key(id);
        let code = self
            .run_script(
                REMOVE_JOB
                    .key(&job_key)
                    .key(format!("{job_key}:lock"))
                    .key(format!("{job_key}:logs"))
                    .key(self.state_key(JobState::Waiting))
                    .key(self.state_key(JobState::Active))
                    .key(self.state_key(JobState::Paused))
                    .key(self.state_key(JobState::Completed))
                    .key(self.state_key(JobState::Failed))
                    .key(self.state_key(JobState::Delayed))
                    .key(self.key("priority"))
                    .arg(id),
            )
            .await?;

        check_code(code, id, JobState::Waiting)
    }

    /// Removes every job in `state`, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedState` for active jobs, or a store error
    pub async fn clean(&self, state: JobState) -> QueueStoreResult<u64> {
        if state == JobState::Active {
            return Err(QueueStoreError::UnsupportedState(state));
        }

        let storage = match state.storage() {
            StateStorage::List => "list",
            StateStorage::SortedSet => "zset",
        };

        let removed = self
            .run_script(
                CLEAN_STATE
                    .key(self.state_key(state))
                    .key(self.key("priority"))
                    .arg(self.key(""))
                    .arg(storage),
            )
            .await?;

        let removed = u64::try_from(removed).unwrap_or(0);
        tracing::info!(queue = %self.name, %state, removed, "Cleaned jobs");
        Ok(removed)
    }

    /// Pauses the queue: waiting jobs are parked and workers stop picking up new ones
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn pause(&self) -> QueueStoreResult<()> {
        self.set_paused(JobState::Waiting, JobState::Paused, "paused")
            .await
    }

    /// Resumes a paused queue
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or times out
    pub async fn resume(&self) -> QueueStoreResult<()> {
        self.set_paused(JobState::Paused, JobState::Waiting, "resumed")
            .await
    }

    async fn set_paused(&self, from: JobState, to: JobState, event: &str) -> QueueStoreResult<()> {
        self.run_script(
            SET_PAUSED
                .key(self.state_key(from))
                .key(self.state_key(to))
                .key(self.key("meta-paused"))
                .arg(event),
        )
        .await?;

        tracing::info!(queue = %self.name, event, "Queue pause state changed");
        Ok(())
    }

    async fn run_script(&self, invocation: &ScriptInvocation<'_>) -> QueueStoreResult<i64> {
        let mut conn = self.client.conn().await?;
        self.client
            .with_timeout(invocation.invoke_async(&mut conn))
            .await
    }
}

fn check_code(code: i64, id: &str, expected: JobState) -> QueueStoreResult<()> {
    match code {
        scripts::OK => Ok(()),
        scripts::MISSING_JOB => Err(QueueStoreError::JobNotFound(id.to_string())),
        scripts::LOCKED => Err(QueueStoreError::JobLocked(id.to_string())),
        _ => Err(QueueStoreError::InvalidJobState {
            id: id.to_string(),
            expected,
        }),
    }
}
