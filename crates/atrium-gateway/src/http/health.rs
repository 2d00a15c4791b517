use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — liveness probe, returns server metadata and feature flags.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let memory_stats = state.memory.stats();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "direct_automation_enabled": state.config.features.direct_automation_enabled,
        "semantic_memory_enabled": state.config.features.semantic_memory_enabled,
        "memory_facts": memory_stats.total_facts,
    }))
}
