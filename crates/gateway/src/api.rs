//! HTTP handlers for the course assistant.
//!
//! Endpoints:
//!
//! - `GET  /health` — liveness probe
//! - `GET  /info`   — which course documents are available
//! - `POST /chat`   — ask a question with optional history

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{error, info};

use coursebot_core::error::ChatError;
use coursebot_core::message::ChatMessage;
use coursebot_core::provider::Usage;

use crate::SharedState;

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The student's question.
    #[serde(default)]
    pub message: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct InfoResponse {
    files_loaded: usize,
    files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A `ChatError` on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: ChatError,
}

impl ApiError {
    /// Send with a specific status instead of the one implied by the error kind.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        let status = if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self.error {
            ChatError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        (self.status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Response for a handler that panicked. The detail is logged, never sent.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");
    ApiError::from(ChatError::Internal(detail.to_string())).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn info_handler(State(state): State<SharedState>) -> Result<Json<InfoResponse>, ApiError> {
    let store = state.orchestrator.context().store().clone();
    let entries = tokio::task::spawn_blocking(move || store.entries())
        .await
        .map_err(|e| {
            error!(error = %e, "Document scan task failed");
            ChatError::Internal(e.to_string())
        })?;

    let files: Vec<String> = entries.into_iter().map(|e| e.name).collect();
    Ok(Json(InfoResponse {
        files_loaded: files.len(),
        files,
    }))
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        let status = rejection.status();
        let err = ApiError::from(ChatError::InvalidRequest(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )));
        // Oversized bodies keep their 413; every other rejection is a 400.
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            err.with_status(status)
        } else {
            err
        }
    })?;

    info!(
        message_len = payload.message.len(),
        history = payload.history.len(),
        "Chat request received"
    );

    let reply = state
        .orchestrator
        .chat(&payload.message, payload.history)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        model: reply.model,
        usage: reply.usage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let response = ApiError::from(ChatError::Internal("db password is hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn invalid_request_is_bad_request() {
        let response = ApiError::from(ChatError::InvalidRequest("No message provided".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No message provided");
    }

    #[tokio::test]
    async fn upstream_error_embeds_message() {
        let response = ApiError::from(ChatError::Upstream("Overloaded".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "API error: Overloaded");
    }

    #[tokio::test]
    async fn panic_becomes_generic_internal_error() {
        let response = panic_response(Box::new(String::from("index out of bounds")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");
    }

    #[test]
    fn chat_request_defaults() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_empty());
        assert!(req.history.is_empty());
    }
}
