//! `POST /approve` — confirm or cancel a pending approval-gated action, per
//! §6. An alternative to replying "yes"/"no" in the chat endpoint itself.

use std::sync::Arc;

use atrium_approval::ResolveOutcome;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::error::GatewayError;

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub message_id: String,
    pub approved: bool,
    #[serde(default)]
    pub edited_data: Option<Value>,
}

#[derive(Serialize)]
pub struct ApproveReply {
    pub success: bool,
    pub message_id: String,
    pub intent: String,
    pub dispatched: bool,
    pub already_resolved: bool,
}

/// A second `POST /approve` for an id already resolved answers `200` with
/// `already_resolved: true` instead of dispatching (or cancelling) again —
/// the webhook call is at-most-once regardless of how many times a client
/// retries the approve call.
pub async fn approve_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<ApproveReply>, GatewayError> {
    let outcome = if req.approved {
        state.approval.confirm_by_id(&req.message_id, req.edited_data).await?
    } else {
        state.approval.cancel_by_id(&req.message_id)?
    };

    let reply = match outcome {
        ResolveOutcome::Dispatched(action) => ApproveReply {
            success: true,
            message_id: action.id,
            intent: action.intent.as_str().to_string(),
            dispatched: true,
            already_resolved: false,
        },
        ResolveOutcome::Cancelled(action) => ApproveReply {
            success: true,
            message_id: action.id,
            intent: action.intent.as_str().to_string(),
            dispatched: false,
            already_resolved: false,
        },
        ResolveOutcome::AlreadyResolved(action) => ApproveReply {
            success: true,
            message_id: action.id,
            intent: action.intent.as_str().to_string(),
            dispatched: false,
            already_resolved: true,
        },
    };
    Ok(Json(reply))
}
