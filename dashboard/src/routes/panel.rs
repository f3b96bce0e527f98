//! Dashboard panel shell

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::middleware::AuthenticatedSession;

const PANEL_PAGE: &str = include_str!("../ui/index.html");

/// Serves the dashboard panel
///
/// The page is a static shell; queue data is loaded from the JSON API.
#[allow(clippy::unused_async)]
pub async fn index(_session: AuthenticatedSession) -> Html<&'static str> {
    Html(PANEL_PAGE)
}

/// Answers any other path under the dashboard prefix once logged in
#[allow(clippy::unused_async)]
pub async fn not_found(_session: AuthenticatedSession) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
