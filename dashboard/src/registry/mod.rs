//! Queues registered with the dashboard
//!
//! Built once at startup from the configuration and never changed
//! afterwards.

use queue_store::{QueueHandle, QueueStoreResult, RedisClient};

use crate::types::Config;

/// Ordered set of queue handles keyed by queue name
#[derive(Debug, Clone)]
pub struct QueueRegistry {
    queues: Vec<QueueHandle>,
}

impl QueueRegistry {
    /// Registers `queues` in the given order
    #[must_use]
    pub const fn new(queues: Vec<QueueHandle>) -> Self {
        Self { queues }
    }

    /// Creates one handle per configured queue name, all sharing one store client
    ///
    /// Nothing is sent to the store here; an unreachable store shows up on
    /// the first dashboard request that reads it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store connection parameters are invalid
    pub fn from_config(config: &Config) -> QueueStoreResult<Self> {
        let client = RedisClient::new(&config.store)?;
        let queues = config
            .queue_names
            .iter()
            .map(|name| QueueHandle::new(name.as_str(), &config.store, client.clone()))
            .collect();

        Ok(Self::new(queues))
    }

    /// Handle for `name`, if registered
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&QueueHandle> {
        self.queues.iter().find(|queue| queue.name() == name)
    }

    /// Registered handles in registration order
    pub fn iter(&self) -> impl Iterator<Item = &QueueHandle> {
        self.queues.iter()
    }

    /// Registered queue names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.queues.iter().map(QueueHandle::name).collect()
    }

    /// Number of registered queues
    #[must_use]
    pub const fn len(&self) -> usize {
        self.queues.len()
    }

    /// Whether no queue is registered
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(queues: &str) -> QueueRegistry {
        let config = Config::from_lookup(|name| match name {
            "QUEUES" => Some(queues.to_string()),
            _ => None,
        })
        .unwrap();
        QueueRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_one_handle_per_queue_name() {
        let registry = registry("emails reports");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["emails", "reports"]);
        assert_eq!(registry.get("emails").unwrap().key("wait"), "bull:emails:wait");
        assert!(registry.get("billing").is_none());
    }

    #[test]
    fn test_handle_count_matches_distinct_tokens() {
        let cases = [
            ("a", 1),
            ("a b c", 3),
            ("  a   b  ", 2),
            ("a a a", 1),
            ("a b a c b", 3),
        ];

        for (queues, expected) in cases {
            assert_eq!(registry(queues).len(), expected, "QUEUES={queues:?}");
        }
    }

    #[test]
    fn test_prefix_applies_to_every_handle() {
        let config = Config::from_lookup(|name| match name {
            "QUEUES" => Some("emails reports".to_string()),
            "PREFIX" => Some("development".to_string()),
            _ => None,
        })
        .unwrap();
        let registry = QueueRegistry::from_config(&config).unwrap();

        let keys: Vec<String> = registry.iter().map(|queue| queue.key("failed")).collect();
        assert_eq!(
            keys,
            vec!["development:emails:failed", "development:reports:failed"]
        );
        assert!(!registry.is_empty());
    }
}
