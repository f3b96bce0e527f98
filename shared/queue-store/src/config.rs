use std::{fmt, time::Duration};

use url::Url;

use crate::error::{QueueStoreError, QueueStoreResult};

/// Key prefix Bull uses when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "bull";

/// Connection parameters for the queue store
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Redis host name or address
    pub host: String,
    /// Redis port
    pub port: u16,
    /// Redis password, empty when the server has no auth
    pub password: String,
    /// Key prefix applied in front of every queue name
    pub prefix: Option<String>,
    /// Upper bound for a single store round trip
    pub command_timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: String::new(),
            prefix: None,
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Key prefix in effect, falling back to Bull's default
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_KEY_PREFIX)
    }

    /// Builds the `redis://` connection URL, percent-encoding the password
    ///
    /// # Errors
    ///
    /// Returns `QueueStoreError::InvalidConnection` if the host cannot form a valid URL
    pub fn redis_url(&self) -> QueueStoreResult<String> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let mut url = Url::parse(&format!("redis://{host}:{}", self.port))
            .map_err(|e| QueueStoreError::InvalidConnection(e.to_string()))?;

        if !self.password.is_empty() {
            url.set_password(Some(&self.password)).map_err(|()| {
                QueueStoreError::InvalidConnection("URL cannot carry a password".to_string())
            })?;
        }

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_key_prefix() {
        let config = StoreConfig::default();
        assert_eq!(config.key_prefix(), "bull");

        let config = StoreConfig {
            prefix: Some("development".to_string()),
            ..StoreConfig::default()
        };
        assert_eq!(config.key_prefix(), "development");
    }

    #[test]
    fn test_redis_url_without_password() {
        let config = StoreConfig::default();
        assert_eq!(config.redis_url().unwrap(), "redis://localhost:6379");
    }

    #[test]
    fn test_redis_url_encodes_password() {
        let config = StoreConfig {
            host: "cache.internal".to_string(),
            port: 6380,
            password: "p@ss".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(
            config.redis_url().unwrap(),
            "redis://:p%40ss@cache.internal:6380"
        );
    }

    #[test]
    fn test_redis_url_brackets_ipv6_host() {
        let config = StoreConfig {
            host: "::1".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(config.redis_url().unwrap(), "redis://[::1]:6379");
    }
}
