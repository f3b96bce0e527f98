mod config;
mod environment;
mod error;
mod redirect;

pub use config::{
    parse_queue_names, Config, ConfigError, DEFAULT_PASSWORD, MISSING_QUEUES_USAGE,
};
pub use environment::Environment;
pub use error::AppError;
pub use redirect::Found;
