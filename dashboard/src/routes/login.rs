//! Login form and credential submission

use std::sync::Arc;

use axum::{
    extract::rejection::FormRejection,
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::{
    auth::{verify_credentials, SESSION_MARKER},
    middleware::SESSION_COOKIE,
    routes::{BASE_PATH, LOGIN_PATH},
    session::SessionStore,
    types::{Config, Environment, Found},
};

const LOGIN_PAGE: &str = include_str!("../ui/login.html");

/// Fields posted by the login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Submitted username
    pub username: String,
    /// Submitted password
    pub password: String,
}

/// Serves the login form
#[allow(clippy::unused_async)]
pub async fn page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// Handles a login form submission
///
/// Creates a session and redirects to the dashboard when the credentials
/// match, otherwise redirects back to the login form without saying why.
/// A body that is not a valid form counts as a failed attempt.
pub async fn submit(
    Extension(config): Extension<Arc<Config>>,
    Extension(sessions): Extension<Arc<SessionStore>>,
    Extension(environment): Extension<Environment>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        tracing::debug!("Rejected malformed login submission");
        return Found(LOGIN_PATH).into_response();
    };

    if !verify_credentials(&config, &form.username, &form.password) {
        tracing::info!("Failed login attempt");
        return Found(LOGIN_PATH).into_response();
    }

    let session = sessions.create(SESSION_MARKER).await;
    tracing::info!("Admin logged in");

    let cookie = session_cookie(&session.id, sessions.ttl().as_secs(), environment);
    ([(SET_COOKIE, cookie)], Found(BASE_PATH)).into_response()
}

/// Formats the `Set-Cookie` value for a new session
fn session_cookie(session_id: &str, max_age_secs: u64, environment: Environment) -> String {
    let secure = if environment.secure_cookies() {
        "; Secure"
    } else {
        ""
    };

    format!(
        "{SESSION_COOKIE}={session_id}; Path={BASE_PATH}; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_cookie_attributes() {
        assert_eq!(
            session_cookie("abc", 60, Environment::Development),
            "queue_dashboard_session=abc; Path=/ui; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert_eq!(
            session_cookie("abc", 60, Environment::Production),
            "queue_dashboard_session=abc; Path=/ui; HttpOnly; SameSite=Lax; Max-Age=60; Secure"
        );
    }
}
