use atrium_core::{IntentTag, RoutingLane, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The object written to the context store. `payload` contains a bounded
/// chat history (last N turns), the latest intent, and a routing
/// annotation — see `ContextPayload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEnvelope {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub intent_tag: IntentTag,
    pub payload: ContextPayload,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContextPayload {
    pub chat_history: Vec<ChatHistoryEntry>,
    pub latest_intent: Option<IntentTag>,
    pub routing: Option<RoutingLane>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub user_text: String,
    pub ai_text: String,
    pub created_at: DateTime<Utc>,
}

/// Where an [`AppendedResult`] originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppendSource {
    Engine,
    Tool,
    Approval,
    ExternalAgent,
}

/// An addendum written after the initial envelope. Ordered list, bounded to
/// 100 most recent per session in hot/warm retrieval; the cold tier keeps
/// the unbounded, paginated log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendedResult {
    pub session_id: SessionId,
    pub append_id: String,
    pub source: AppendSource,
    pub output: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Result of `ReadContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub envelope: Option<ContextEnvelope>,
    pub appends: Vec<AppendedResult>,
    pub total: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}
