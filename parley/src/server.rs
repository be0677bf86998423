//! HTTP surface.
//!
//! - `GET /` health check, `{"status":"ok"}`.
//! - `POST /chat?message=...&session_id=...` replies `{"response": "..."}`. The
//!   message may be sent as a plain-text body instead of the query parameter.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pchat::ChatErrorKind;
use pcommon::SessionId;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::Assistant;

#[derive(Clone)]
struct AppState {
    assistant: Arc<Assistant>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatQuery {
    message: Option<String>,
    session_id: Option<String>,
}

pub fn router(assistant: Arc<Assistant>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .with_state(AppState { assistant })
}

/// Serves until ctrl-c.
pub async fn serve(assistant: Arc<Assistant>, address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!(address = %listener.local_addr()?, mode = %assistant.mode(), "listening");

    axum::serve(listener, router(assistant))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("ctrl-c handler unavailable; serving until killed");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
    body: String,
) -> Response {
    let message = query
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or(body);
    if message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    let session_id = query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map(SessionId::new)
        .unwrap_or_default();

    match state.assistant.chat(session_id, message).await {
        Ok(reply) => Json(json!({ "response": reply })).into_response(),
        Err(error) if error.kind == ChatErrorKind::InvalidRequest => {
            error_response(StatusCode::BAD_REQUEST, &error.message)
        }
        Err(error) => {
            tracing::error!(%error, "chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.message)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
