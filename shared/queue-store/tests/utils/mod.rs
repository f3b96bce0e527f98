use anyhow::Result;
use queue_store::{JobState, QueueHandle, RedisClient, StoreConfig};
use redis::{aio::ConnectionManager, AsyncCommands};

/// Every test works under its own key prefix so runs never collide
pub struct TestContext {
    pub handle: QueueHandle,
    pub conn: ConnectionManager,
}

impl TestContext {
    /// Create a new test context against the Redis on localhost
    pub async fn new() -> Result<Self> {
        let config = StoreConfig {
            host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            prefix: Some(format!("test-{}", uuid::Uuid::new_v4())),
            ..StoreConfig::default()
        };

        let client = RedisClient::new(&config)?;
        let conn = client.conn().await?;
        let handle = QueueHandle::new("emails", &config, client);

        Ok(Self { handle, conn })
    }

    /// Writes a job hash and files its id under `state`
    pub async fn add_job(&mut self, state: JobState, id: &str, fields: &[(&str, &str)]) -> Result<()> {
        let job_key = self.handle.key(id);
        let state_key = self.handle.key(state.key_suffix());

        if !fields.is_empty() {
            self.conn
                .hset_multiple::<_, _, _, ()>(&job_key, fields)
                .await?;
        }

        match state {
            JobState::Waiting | JobState::Active | JobState::Paused => {
                self.conn.lpush::<_, _, ()>(&state_key, id).await?;
            }
            JobState::Completed | JobState::Failed | JobState::Delayed => {
                let score: i64 = id.parse().unwrap_or(0);
                self.conn.zadd::<_, _, _, ()>(&state_key, id, score).await?;
            }
        }

        Ok(())
    }

    pub async fn list(&mut self, suffix: &str) -> Result<Vec<String>> {
        Ok(self.conn.lrange(self.handle.key(suffix), 0, -1).await?)
    }

    pub async fn sorted_set(&mut self, suffix: &str) -> Result<Vec<String>> {
        Ok(self.conn.zrange(self.handle.key(suffix), 0, -1).await?)
    }
}
