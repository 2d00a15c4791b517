use std::collections::HashMap;
use std::sync::Arc;

use atrium_core::{SessionId, UserId};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::is_authorized;
use crate::context::WhatsAppContext;
use crate::types::{wrap_raw_body, IncomingPayload, OutgoingEnvelope};

const DEFAULT_USER_ID: &str = "whatsapp_user";

fn query_token(params: &HashMap<String, String>) -> Option<&str> {
    params.get("token").map(|s| s.as_str())
}

/// `GET /api/mcp` — connectivity probe. No auth required; the bridge polls
/// this before attempting to send messages, per §4.6.
pub async fn probe<C: WhatsAppContext>(
    State(_ctx): State<Arc<C>>,
) -> Json<Value> {
    Json(json!({ "ok": true, "service": "whatsapp-bridge" }))
}

/// `POST /api/mcp` — the message endpoint. Accepts either a JSON object
/// payload or a raw string body (wrapped into a synthetic object per §9
/// Open Question 4).
pub async fn handle_message<C: WhatsAppContext>(
    State(ctx): State<Arc<C>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (axum::http::StatusCode, Json<Value>) {
    if !is_authorized(ctx.shared_token().as_deref(), &headers, query_token(&params)) {
        return (axum::http::StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthenticated" })));
    }

    if body.is_empty() {
        // Empty body is treated as a probe too, per §8 boundary behaviours.
        return (axum::http::StatusCode::OK, Json(json!({ "ok": true, "service": "whatsapp-bridge" })));
    }

    let value: Value = match serde_json::from_slice(&body) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(Value::String(s)) => wrap_raw_body(&s),
        Ok(other) => other,
        Err(_) => wrap_raw_body(&String::from_utf8_lossy(&body)),
    };

    let payload: IncomingPayload = serde_json::from_value(value.clone()).unwrap_or_default();
    let Some(text) = payload.extract_text() else {
        return (axum::http::StatusCode::BAD_REQUEST, Json(json!({ "error": "no message text found in payload" })));
    };

    let raw_session_id = payload.session_id.clone().unwrap_or_else(|| chrono::Utc::now().timestamp().to_string());
    let session_id = match &payload.session_id {
        Some(raw) => SessionId::whatsapp_namespaced(raw),
        None => SessionId::auto_assigned(chrono::Utc::now().timestamp()),
    };
    let user_id = UserId::new(payload.user_id.clone().unwrap_or_else(|| DEFAULT_USER_ID.to_string()));

    info!(session_id = %session_id, "whatsapp bridge message received");

    let result = ctx.handle_message(&session_id, &user_id, text).await;
    ctx.log_conversation(&session_id, "whatsapp", &value, &result.message, &result.intent, result.needs_approval);

    (
        axum::http::StatusCode::OK,
        Json(serde_json::to_value(OutgoingEnvelope {
            success: true,
            session_id: raw_session_id,
            message: result.message,
            intent: result.intent,
            needs_approval: result.needs_approval,
            platform: "whatsapp",
            timestamp: chrono::Utc::now(),
            conversation_id: Uuid::new_v4().to_string(),
            intent_data: result.intent_data,
            approval_info: result.approval_info,
        }).unwrap_or(Value::Null)),
    )
}

/// `GET/POST /api/mcp/validate` — identifies this bridge instance to the
/// upstream integration.
pub async fn validate<C: WhatsAppContext>(State(ctx): State<Arc<C>>) -> Json<Value> {
    Json(json!({ "ok": true, "identifier": ctx.validate_identifier() }))
}
