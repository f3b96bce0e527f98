use dashboard::{
    server,
    types::{Config, ConfigError, Environment, MISSING_QUEUES_USAGE},
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Use JSON format for staging/production, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingQueues) => {
            for line in MISSING_QUEUES_USAGE {
                println!("{line}");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    server::start(environment, config).await
}
