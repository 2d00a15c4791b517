//! `GET`/`DELETE /history/{session_id}` — raw turn log for a session, from
//! the cold tier of the context store.

use std::sync::Arc;

use atrium_core::SessionId;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::GatewayError;

#[derive(Serialize)]
pub struct HistoryMessage {
    pub text: String,
    #[serde(rename = "isUser")]
    pub is_user: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HistoryReply {
    pub messages: Vec<HistoryMessage>,
}

pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryReply>, GatewayError> {
    let sid = SessionId::new(session_id);
    let turns = state.context.list_turns(&sid)?;

    // Each turn is one user utterance plus one AI reply — flatten into the
    // message-pair stream a chat client renders, oldest first.
    let mut messages = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        messages.push(HistoryMessage {
            text: turn.user_text,
            is_user: true,
            created_at: turn.created_at,
        });
        messages.push(HistoryMessage {
            text: turn.ai_text,
            is_user: false,
            created_at: turn.created_at,
        });
    }

    Ok(Json(HistoryReply { messages }))
}

pub async fn delete_history_handler(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let sid = SessionId::new(session_id);
    state.context.delete_turns(&sid)?;
    Ok(Json(json!({ "ok": true })))
}
