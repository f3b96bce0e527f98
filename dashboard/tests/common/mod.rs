use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use dashboard::{
    registry::QueueRegistry,
    server,
    session::SessionStore,
    types::{Config, Environment},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to a queue store that refuses connections
#[allow(dead_code)]
pub struct TestSetup {
    pub router: Router,
    pub config: Arc<Config>,
    pub registry: Arc<QueueRegistry>,
    pub sessions: Arc<SessionStore>,
}

impl TestSetup {
    pub fn new(vars: &[(&str, &str)]) -> Self {
        Self::with_environment(Environment::Development, vars)
    }

    pub fn with_environment(environment: Environment, vars: &[(&str, &str)]) -> Self {
        setup_test_env();

        let mut lookup: HashMap<String, String> = [
            ("QUEUES", "emails reports"),
            // Nothing listens on port 1, so every store call fails fast
            ("REDIS_HOST", "127.0.0.1"),
            ("REDIS_PORT", "1"),
            ("REDIS_TIMEOUT_MS", "500"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        lookup.extend(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );

        let config = Arc::new(
            Config::from_lookup(|name| lookup.get(name).cloned()).expect("valid test config"),
        );
        let registry =
            Arc::new(QueueRegistry::from_config(&config).expect("valid store parameters"));
        let sessions = Arc::new(SessionStore::new(config.session_ttl));

        let router = server::router(
            environment,
            config.clone(),
            registry.clone(),
            sessions.clone(),
        );

        Self {
            router,
            config,
            registry,
            sessions,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, route: &str, cookie: Option<&str>) -> Response {
        self.request("GET", route, cookie).await
    }

    pub async fn request(&self, method: &str, route: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method(method);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
            .await
    }

    pub async fn post_form(&self, route: &str, body: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Logs in and returns the `name=value` pair to send back as `Cookie`
    pub async fn login(&self, username: &str, password: &str) -> Option<String> {
        let response = self
            .post_form(
                "/ui/login",
                &format!("username={username}&password={password}"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        session_cookie(&response)
    }
}

/// `Location` header of a redirect
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Full `Set-Cookie` header value, if any
pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// `name=value` part of the `Set-Cookie` header
pub fn session_cookie(response: &Response) -> Option<String> {
    set_cookie(response).and_then(|cookie| cookie.split(';').next().map(ToString::to_string))
}

pub async fn body_text(response: Response) -> String {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    serde_json::from_slice(&body).expect("json body")
}
