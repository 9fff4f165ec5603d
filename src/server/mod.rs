// src/server/mod.rs

//! HTTP surface: health check, data API and the Telegram webhook.

pub mod telegram;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::models::INSTITUTION;
use crate::services::{IntentClassifier, Responder};
use crate::storage::SnapshotStore;

pub use telegram::{TelegramClient, Update};

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub classifier: IntentClassifier,
    pub responder: Arc<Responder>,
    pub telegram: Option<Arc<TelegramClient>>,
}

impl AppState {
    pub fn new(
        store: Arc<SnapshotStore>,
        responder: Responder,
        telegram: Option<TelegramClient>,
    ) -> Self {
        Self {
            store,
            classifier: IntentClassifier::new(),
            responder: Arc::new(responder),
            telegram: telegram.map(Arc::new),
        }
    }
}

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/university-data", get(university_data))
        .route("/webhook", post(webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let token = if state.telegram.is_some() {
        "✅ Configured"
    } else {
        "❌ Missing - Please set TELEGRAM_TOKEN environment variable"
    };
    Json(json!({
        "status": "WH-HelperBot is running! 🚀",
        "timestamp": Utc::now().to_rfc3339(),
        "institution": INSTITUTION,
        "features": ["Real-time web scraping", "Telegram integration", "Smart caching"],
        "telegramToken": token,
    }))
}

async fn university_data(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.store.load().await;
    Json(json!({
        "success": true,
        "data": *snapshot,
        "cached": true,
    }))
}

fn error_response(status: StatusCode, error: impl std::fmt::Display) -> Response {
    (
        status,
        Json(json!({
            "error": error.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

#[tracing::instrument(skip_all, fields(chat_id = tracing::field::Empty))]
async fn webhook(
    State(state): State<AppState>,
    update: std::result::Result<Json<Update>, JsonRejection>,
) -> Response {
    let update = match update {
        Ok(Json(update)) => update,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed update");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let Some(telegram) = state.telegram.as_ref() else {
        tracing::error!("TELEGRAM_TOKEN not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "TELEGRAM_TOKEN environment variable not set",
                "instructions": "Set TELEGRAM_TOKEN (or server.telegram_token in the config file) and restart the server",
            })),
        )
            .into_response();
    };

    let Some((chat_id, text)) = update.text_message() else {
        return StatusCode::OK.into_response();
    };
    tracing::Span::current().record("chat_id", chat_id);
    tracing::info!(sender = update.sender_name(), text, "Received message");

    let intent = state.classifier.classify(text);
    let snapshot = state.store.load().await;
    let reply = state.responder.render(intent, &snapshot);
    tracing::info!(%intent, length = reply.len(), "Sending reply");

    match telegram.send_message(chat_id, &reply).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Webhook error");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
