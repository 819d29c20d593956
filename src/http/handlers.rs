use super::socket;
use super::state::AppState;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /
/// Upgrade to the realtime conversation socket, or serve the landing page
pub async fn root(State(state): State<AppState>, ws: Option<WebSocketUpgrade>) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |upgraded| socket::handle_socket(upgraded, state)),
        None => index(&state).await,
    }
}

async fn index(state: &AppState) -> Response {
    let path = state.public_dir.join("index.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "index.html not found".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
