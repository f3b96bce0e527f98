use std::{sync::Arc, time::Duration};

use aide::openapi::{Info, OpenApi};
use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    auth::ADMIN_USERNAME,
    registry::QueueRegistry,
    routes::{self, BASE_PATH},
    session::SessionStore,
    types::{Config, Environment},
};

/// How often expired sessions are purged
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_mins(1);

/// Builds the application router with every shared dependency attached
pub fn router(
    environment: Environment,
    config: Arc<Config>,
    registry: Arc<QueueRegistry>,
    sessions: Arc<SessionStore>,
) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Queue Dashboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(config))
        .layer(Extension(registry))
        .layer(Extension(sessions))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// Starts the server with the given environment and configuration
///
/// # Errors
///
/// Returns an error if the queue store parameters are invalid or the server
/// fails to bind to the port
pub async fn start(environment: Environment, config: Config) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let registry = Arc::new(QueueRegistry::from_config(&config)?);
    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    let cleanup = sessions.clone().spawn_cleanup(SESSION_CLEANUP_INTERVAL);

    tracing::info!(
        queues = ?registry.names(),
        prefix = config.store.key_prefix(),
        "Registered queues"
    );

    let router = router(environment, config.clone(), registry, sessions);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(port = config.port, "Queue Dashboard started");
    // Always shown, whatever the log filter
    for line in banner(&config) {
        println!("{line}");
    }

    let result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from);

    cleanup.abort();
    result
}

/// Startup lines telling the operator where to find the UI and how to log in
fn banner(config: &Config) -> Vec<String> {
    vec![
        format!("🚀 Queue Dashboard started on port {}", config.port),
        format!("For the UI, open http://localhost:{}{BASE_PATH}", config.port),
        format!(
            "Make sure Redis is running on {}:{}",
            config.store.host, config.store.port
        ),
        "Login with:".to_string(),
        format!("Username: {ADMIN_USERNAME}"),
        format!("Password: {}", config.password),
    ]
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
