use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

/// State a job can be in, one store key per state
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobState {
    /// Queued and waiting for a worker
    Waiting,
    /// Picked up by a worker
    Active,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Scheduled to become waiting later
    Delayed,
    /// Waiting while the queue is paused
    Paused,
}

/// How a state's job ids are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateStorage {
    List,
    SortedSet,
}

impl JobState {
    /// Key suffix of the list or sorted set holding this state's job ids
    #[must_use]
    pub const fn key_suffix(self) -> &'static str {
        match self {
            Self::Waiting => "wait",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Delayed => "delayed",
            Self::Paused => "paused",
        }
    }

    pub(crate) const fn storage(self) -> StateStorage {
        match self {
            Self::Waiting | Self::Active | Self::Paused => StateStorage::List,
            Self::Completed | Self::Failed | Self::Delayed => StateStorage::SortedSet,
        }
    }
}

/// Number of jobs in each state of one queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCounts {
    /// Waiting jobs
    pub waiting: u64,
    /// Active jobs
    pub active: u64,
    /// Completed jobs
    pub completed: u64,
    /// Failed jobs
    pub failed: u64,
    /// Delayed jobs
    pub delayed: u64,
    /// Jobs parked while the queue is paused
    pub paused: u64,
}

impl JobCounts {
    /// Count for a single state
    #[must_use]
    pub const fn get(&self, state: JobState) -> u64 {
        match state {
            JobState::Waiting => self.waiting,
            JobState::Active => self.active,
            JobState::Completed => self.completed,
            JobState::Failed => self.failed,
            JobState::Delayed => self.delayed,
            JobState::Paused => self.paused,
        }
    }
}

/// A job record as stored in its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job id
    pub id: String,
    /// Job name, `__default__` for unnamed jobs
    pub name: String,
    /// Job payload
    pub data: Value,
    /// Options the job was added with
    pub opts: Value,
    /// Last reported progress
    pub progress: Value,
    /// Number of attempts made so far
    pub attempts_made: u32,
    /// Error message of the last failure
    pub failed_reason: Option<String>,
    /// Stack traces of past failures
    pub stacktrace: Vec<String>,
    /// Value returned by the processor
    pub return_value: Value,
    /// Creation time in milliseconds since the epoch
    pub timestamp: Option<i64>,
    /// Time processing started
    pub processed_on: Option<i64>,
    /// Time processing finished
    pub finished_on: Option<i64>,
    /// Delay in milliseconds the job was scheduled with
    pub delay: Option<i64>,
}

impl Job {
    /// Builds a job from its hash fields, `None` if the hash is gone
    #[must_use]
    pub fn from_hash(id: impl Into<String>, fields: &HashMap<String, String>) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }

        let number = |field: &str| fields.get(field).and_then(|v| v.parse::<i64>().ok());

        Some(Self {
            id: id.into(),
            name: fields
                .get("name")
                .cloned()
                .unwrap_or_else(|| "__default__".to_string()),
            data: parse_json(fields.get("data")),
            opts: parse_json(fields.get("opts")),
            progress: parse_json(fields.get("progress")),
            attempts_made: fields
                .get("attemptsMade")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            failed_reason: fields
                .get("failedReason")
                .filter(|v| !v.is_empty())
                .cloned(),
            stacktrace: parse_stacktrace(fields.get("stacktrace")),
            return_value: parse_json(fields.get("returnvalue")),
            timestamp: number("timestamp"),
            processed_on: number("processedOn"),
            finished_on: number("finishedOn"),
            delay: number("delay"),
        })
    }
}

/// Job fields are JSON encoded, but older writers stored raw strings
fn parse_json(raw: Option<&String>) -> Value {
    raw.map_or(Value::Null, |raw| {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
    })
}

fn parse_stacktrace(raw: Option<&String>) -> Vec<String> {
    match parse_json(raw) {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    }
}
