use std::sync::Arc;

use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;

use crate::{
    routes::LOGIN_PATH,
    session::{Session, SessionStore},
    types::{AppError, Found},
};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "queue_dashboard_session";

/// Live session attached to a request by [`load_session`]
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedSession {
    /// Id of the session
    pub session_id: String,
    /// Marker stored at login
    pub marker: String,
}

impl From<Session> for AuthenticatedSession {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            marker: session.marker,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_session",
                "Authentication required but no session found in request extensions",
                false,
            )
        })
    }
}

/// First stage of the login gate
///
/// Resolves the session cookie against the session store and attaches an
/// [`AuthenticatedSession`] to the request when it names a live session.
/// Never rejects a request on its own.
pub async fn load_session(
    Extension(sessions): Extension<Arc<SessionStore>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = sessions.get(cookie.value()).await {
            request
                .extensions_mut()
                .insert(AuthenticatedSession::from(session));
        } else {
            tracing::debug!("Session cookie does not name a live session");
        }
    }

    next.run(request).await
}

/// Second stage of the login gate
///
/// Redirects to the login form unless [`load_session`] attached a session.
pub async fn ensure_logged_in(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedSession>().is_none() {
        return Found(LOGIN_PATH).into_response();
    }

    next.run(request).await
}
