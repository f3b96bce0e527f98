//! In-process login sessions
//!
//! Sessions only live as long as the process. A browser holds the session id
//! in a cookie; the record behind it expires after the configured TTL and is
//! purged by a background task.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tokio::{sync::RwLock, task::JoinHandle};

const SESSION_ID_LEN: usize = 64;

/// Server-side session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Random id carried by the session cookie
    pub id: String,
    /// Opaque value stored at login
    pub marker: String,
    /// Login time
    pub created_at: DateTime<Utc>,
    /// Time after which the session is rejected
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session records keyed by session id
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions live for `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Lifetime of new sessions
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn generate_session_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Creates and stores a session holding `marker`
    pub async fn create(&self, marker: &str) -> Session {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let session = Session {
            id: Self::generate_session_id(),
            marker: marker.to_string(),
            created_at: now,
            expires_at,
        };

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());

        session
    }

    /// Looks up a live session; expired sessions are treated as missing
    pub async fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(id)
            .filter(|session| !session.is_expired_at(now))
            .cloned()
    }

    /// Deletes every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }

    /// Number of stored sessions, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Purges expired sessions every `interval` until the handle is aborted
    pub fn spawn_cleanup(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    tracing::debug!(removed, "Purged expired sessions");
                }
            }
        })
    }
}
