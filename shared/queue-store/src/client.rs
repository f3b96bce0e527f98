use std::{future::Future, sync::Arc, time::Duration};

use redis::{aio::ConnectionManager, Client};
use tokio::{sync::OnceCell, time::timeout};

use crate::{
    config::StoreConfig,
    error::{QueueStoreError, QueueStoreResult},
};

struct Inner {
    client: Client,
    connection_manager: OnceCell<ConnectionManager>,
    command_timeout: Duration,
}

/// Redis client shared by every queue handle
///
/// The connection is opened on first use, so building a client never
/// touches the network. Once open, the connection manager multiplexes all
/// commands over one connection and reconnects on its own.
#[derive(Clone)]
pub struct RedisClient {
    inner: Arc<Inner>,
}

impl RedisClient {
    /// Create a new lazily connected Redis client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection parameters do not form a valid Redis URL
    pub fn new(config: &StoreConfig) -> QueueStoreResult<Self> {
        let client = Client::open(config.redis_url()?)?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                connection_manager: OnceCell::new(),
                command_timeout: config.command_timeout,
            }),
        })
    }

    /// Get a clone of the connection manager, connecting on first call
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached within the command timeout
    pub async fn conn(&self) -> QueueStoreResult<ConnectionManager> {
        let manager = self
            .inner
            .connection_manager
            .get_or_try_init(|| async {
                tracing::info!("Connecting to queue store");
                self.with_timeout(ConnectionManager::new(self.inner.client.clone()))
                    .await
            })
            .await?;

        Ok(manager.clone())
    }

    /// Runs one store round trip under the configured command timeout
    ///
    /// # Errors
    ///
    /// Returns `QueueStoreError::Timeout` when the timeout elapses, or the Redis error
    pub async fn with_timeout<T, F>(&self, fut: F) -> QueueStoreResult<T>
    where
        F: Future<Output = redis::RedisResult<T>> + Send,
    {
        timeout(self.inner.command_timeout, fut)
            .await
            .map_err(|_| QueueStoreError::Timeout)?
            .map_err(QueueStoreError::from)
    }
}
