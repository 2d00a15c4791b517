//! Machine-to-machine endpoints over the Multi-tier Context Store, gated by
//! the shared `gateway.mcp_token` bearer token (no token configured means
//! no auth is enforced — a deliberately permissive default for local/dev
//! deployments, matching the rest of this gateway's auth posture).

use std::sync::Arc;

use atrium_context::{AppendSource, AppendedResult, ContextEnvelope, ContextPayload};
use atrium_core::error::AtriumError;
use atrium_core::{IntentTag, SessionId, UserId};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::GatewayError;

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    match &state.config.gateway.mcp_token {
        None => true,
        Some(expected) => headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t == expected)
            .unwrap_or(false),
    }
}

fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<(), GatewayError> {
    if authorized(state, headers) {
        Ok(())
    } else {
        Err(GatewayError(AtriumError::Unauthenticated(
            "missing or invalid bearer token".to_string(),
        )))
    }
}

pub async fn read_context_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    require_auth(&state, &headers)?;
    let snapshot = state.context.read_context(&SessionId::new(session_id)).await?;
    Ok(Json(serde_json::to_value(snapshot).unwrap_or(Value::Null)))
}

#[derive(Deserialize)]
pub struct WriteContextRequest {
    pub session_id: String,
    pub user_id: String,
    pub intent_tag: String,
}

pub async fn write_context_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<WriteContextRequest>,
) -> Result<Json<Value>, GatewayError> {
    require_auth(&state, &headers)?;

    let intent_tag = IntentTag::from_str_tag(&req.intent_tag).unwrap_or(IntentTag::GeneralChat);
    let now = Utc::now();
    let envelope = ContextEnvelope {
        session_id: SessionId::new(req.session_id),
        user_id: UserId::new(req.user_id),
        intent_tag,
        payload: ContextPayload::default(),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(state.config.context.warm_ttl_secs),
    };
    state.context.write_context(envelope).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct AppendContextRequest {
    pub session_id: String,
    pub output: Value,
}

pub async fn append_context_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AppendContextRequest>,
) -> Result<Json<Value>, GatewayError> {
    require_auth(&state, &headers)?;

    let append = AppendedResult {
        session_id: SessionId::new(req.session_id),
        append_id: Uuid::new_v4().to_string(),
        source: AppendSource::ExternalAgent,
        output: req.output,
        created_at: Utc::now(),
    };
    state.context.append_context(append).await?;
    Ok(Json(json!({ "ok": true })))
}
