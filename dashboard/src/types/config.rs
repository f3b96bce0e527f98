//! Process configuration, read once at startup

use std::{collections::HashSet, env, fmt, str::FromStr, time::Duration};

use queue_store::StoreConfig;
use thiserror::Error;

/// Password used when `PASSWORD` is unset or empty
pub const DEFAULT_PASSWORD: &str = "123456";
/// HTTP port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3210;
/// Session lifetime used when `SESSION_TTL_SECS` is unset
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
/// Store round trip timeout used when `REDIS_TIMEOUT_MS` is unset
pub const DEFAULT_REDIS_TIMEOUT_MS: u64 = 5_000;

/// Lines printed on standard output when no queue names are configured
pub const MISSING_QUEUES_USAGE: [&str; 2] = [
    "Please provide queue names",
    "Example: QUEUES=\"events\" PASSWORD=123 queue-dashboard",
];

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `QUEUES` is unset or holds no queue names
    #[error("QUEUES environment variable is not set or lists no queue names")]
    MissingQueues,

    /// A numeric variable could not be parsed
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Everything the dashboard needs, passed explicitly to each component
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Distinct queue names in configuration order
    pub queue_names: Vec<String>,
    /// Password of the single admin account
    pub password: String,
    /// Queue store connection parameters
    pub store: StoreConfig,
    /// HTTP listen port
    pub port: u16,
    /// Lifetime of a login session
    pub session_ttl: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("queue_names", &self.queue_names)
            .field("password", &"<redacted>")
            .field("store", &self.store)
            .field("port", &self.port)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingQueues` if no queue names are configured, or
    /// `ConfigError::InvalidNumber` for unparseable numeric variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value
    ///
    /// Empty values count as unset, so they fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingQueues` if no queue names are configured, or
    /// `ConfigError::InvalidNumber` for unparseable numeric variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let queue_names = var("QUEUES")
            .map(|raw| parse_queue_names(&raw))
            .filter(|names| !names.is_empty())
            .ok_or(ConfigError::MissingQueues)?;

        let store = StoreConfig {
            host: var("REDIS_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_number("REDIS_PORT", var("REDIS_PORT"), 6379)?,
            password: var("REDIS_PASSWORD").unwrap_or_default(),
            prefix: var("PREFIX"),
            command_timeout: Duration::from_millis(parse_number(
                "REDIS_TIMEOUT_MS",
                var("REDIS_TIMEOUT_MS"),
                DEFAULT_REDIS_TIMEOUT_MS,
            )?),
        };

        Ok(Self {
            queue_names,
            password: var("PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            store,
            port: parse_number("PORT", var("PORT"), DEFAULT_PORT)?,
            session_ttl: Duration::from_secs(parse_number(
                "SESSION_TTL_SECS",
                var("SESSION_TTL_SECS"),
                DEFAULT_SESSION_TTL_SECS,
            )?),
        })
    }
}

/// Splits a space separated list, trimming tokens and dropping blanks and repeats
#[must_use]
pub fn parse_queue_names(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(' ')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(ToString::to_string)
        .collect()
}

fn parse_number<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value })
    })
}
