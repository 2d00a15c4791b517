//! Semantic memory introspection and maintenance endpoints.

use std::sync::Arc;

use atrium_memory::{MemoryDecision, MemoryManager};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::GatewayError;

#[derive(Serialize)]
pub struct MemoryStatsReply {
    pub total_facts: usize,
    pub by_category: std::collections::BTreeMap<String, usize>,
}

pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<MemoryStatsReply> {
    let stats = state.memory.stats();
    Json(MemoryStatsReply {
        total_facts: stats.total_facts,
        by_category: stats.by_category,
    })
}

const DEFAULT_RECALL_LIMIT: usize = 5;

#[derive(Deserialize)]
pub struct ProcessRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Runs the store/forget/recall/none decision for an utterance directly,
/// bypassing the chat pipeline — useful for backfilling facts or testing
/// the extractor.
pub async fn process_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<Value>, GatewayError> {
    let session_id = req.session_id.as_deref().unwrap_or("default");
    let decision = MemoryManager::classify(&req.message);
    let fact = match decision {
        MemoryDecision::Store => state.memory.process_store(&req.message, session_id)?,
        MemoryDecision::Forget => state.memory.process_forget(&req.message)?,
        MemoryDecision::None => None,
        MemoryDecision::Recall => {
            let facts = state.memory.process_recall(&req.message, DEFAULT_RECALL_LIMIT);
            return Ok(Json(json!({
                "decision": format!("{decision:?}"),
                "facts": facts,
            })));
        }
    };
    Ok(Json(json!({
        "decision": format!("{decision:?}"),
        "fact": fact,
    })))
}

pub async fn context_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "context": state.memory.context_for_ai() }))
}
