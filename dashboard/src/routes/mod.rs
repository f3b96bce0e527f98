mod docs;
pub mod health;
pub mod login;
pub mod panel;
pub mod queues;

use aide::axum::{
    routing::{get, put},
    ApiRouter,
};
use axum::{middleware, routing};

use crate::middleware::{ensure_logged_in, load_session};

/// URL prefix of the dashboard
pub const BASE_PATH: &str = "/ui";

/// Path of the login form
pub const LOGIN_PATH: &str = "/ui/login";

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    let public_routes = ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .route(LOGIN_PATH, routing::get(login::page).post(login::submit));

    let protected_routes = ApiRouter::new()
        .route(BASE_PATH, routing::get(panel::index))
        .route("/ui/", routing::get(panel::index))
        .api_route("/ui/api/queues", get(queues::list_queues))
        .api_route("/ui/api/queues/{queue}/jobs", get(queues::list_jobs))
        .api_route(
            "/ui/api/queues/{queue}/jobs/{id}",
            get(queues::get_job).delete(queues::remove_job),
        )
        .api_route(
            "/ui/api/queues/{queue}/jobs/{id}/retry",
            put(queues::retry_job),
        )
        .api_route(
            "/ui/api/queues/{queue}/jobs/{id}/promote",
            put(queues::promote_job),
        )
        .api_route("/ui/api/queues/{queue}/retry", put(queues::retry_all))
        .api_route(
            "/ui/api/queues/{queue}/clean/{status}",
            put(queues::clean),
        )
        .api_route("/ui/api/queues/{queue}/pause", put(queues::pause))
        .api_route("/ui/api/queues/{queue}/resume", put(queues::resume))
        .route("/ui/{*path}", routing::any(panel::not_found))
        // Layers run bottom-up: the session is loaded before it is checked.
        // Route layers leave unmatched paths outside the prefix to the 404 fallback.
        .route_layer(middleware::from_fn(ensure_logged_in))
        .route_layer(middleware::from_fn(load_session));

    public_routes.merge(protected_routes)
}
