//! Health, reference data, and the page shell.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use xaiboard_common::wire::ProjectSummary;
use xaiboard_session::BootstrapStatus;

use crate::error::ApiError;
use crate::state::{SharedState, UNAVAILABLE_PATH};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub session: Uuid,
    pub bootstrap: BootstrapStatus,
}

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        session: state.session.id(),
        bootstrap: state.bootstrap.status(),
    })
}

/// GET /api/projects: reference data loaded at bootstrap
pub async fn projects(State(state): State<SharedState>) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    if let Some(kind) = state.bootstrap.error() {
        return Err(ApiError::Unavailable(kind));
    }
    state
        .bootstrap
        .projects()
        .map(|p| Json(p.to_vec()))
        .ok_or(ApiError::NotReady)
}

/// GET /: dashboard shell, or the unavailable page once bootstrap failed
pub async fn index(State(state): State<SharedState>) -> Response {
    if state.bootstrap.error().is_some() {
        return Redirect::to(UNAVAILABLE_PATH).into_response();
    }
    Html(SHELL_HTML).into_response()
}

/// GET /unavailable: terminal page; no retry is offered
pub async fn unavailable(State(state): State<SharedState>) -> Html<String> {
    let message = state
        .bootstrap
        .error()
        .map(|kind| kind.message())
        .unwrap_or("The dashboard is not available.");
    Html(format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Unavailable | xaiboard</title>
</head>
<body>
<main class="main-content">
    <h1 class="page-title">Dashboard unavailable</h1>
    <p class="text-muted">{}</p>
    <p class="text-muted">Reference data could not be loaded. Restart the server once the explanation backend is reachable.</p>
</main>
</body>
</html>"#, message))
}

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>xaiboard</title>
</head>
<body>
<main class="main-content" id="dashboard" data-view="/api/view" data-events="/api/events">
    <h1 class="page-title">Explanation ranking</h1>
    <p class="text-muted">Select inputs and explainers to compare attribution quality.</p>
</main>
<script>
const events = new EventSource("/api/events");
events.onmessage = (msg) => {
    const data = JSON.parse(msg.data);
    if (data.channel === "bootstrap" && data.event.type === "unavailable") {
        window.location.replace(data.event.location);
    }
};
</script>
</body>
</html>"#;
