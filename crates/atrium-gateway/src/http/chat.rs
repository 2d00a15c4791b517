//! Primary conversational endpoint — `POST /chat`.
//!
//! Runs one full turn through classification, routing and, when the lane
//! calls for it, dialogue rendering. Also the place a short "yes"/"no"
//! reply to an outstanding approval gets resolved, ahead of classification.

use std::sync::Arc;

use atrium_core::{Channel, SessionId, Turn, UserId};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;

const DEFAULT_SESSION: &str = "default";
const DEFAULT_USER: &str = "anonymous";

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub id: String,
    pub message: String,
    pub response: String,
    pub intent_data: Value,
    pub needs_approval: bool,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub user_id: String,
}

#[derive(Serialize)]
pub struct ChatError {
    pub error: String,
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ChatError>)> {
    if req.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ChatError {
                error: "message cannot be empty".to_string(),
            }),
        ));
    }

    let session_id = SessionId::new(req.session_id.as_deref().unwrap_or(DEFAULT_SESSION));
    let user_id = UserId::new(req.user_id.as_deref().unwrap_or(DEFAULT_USER));

    let result = state.handle_turn(&session_id, &user_id, Channel::Http, &req.message).await;
    // When a turn needs approval, `id` is the pending action's id — the
    // same id a later `POST /approve {message_id: id, ...}` resolves.
    let id = result.pending_action_id.clone().unwrap_or_else(Turn::new_id);

    Ok(Json(ChatReply {
        id,
        message: req.message,
        response: result.reply,
        intent_data: result.intent_data,
        needs_approval: result.needs_approval,
        timestamp: Utc::now(),
        session_id: session_id.as_str().to_string(),
        user_id: user_id.as_str().to_string(),
    }))
}
