use atrium_core::{IntentTag, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// State machine diagram from §4.3: PENDING -> DISPATCHED on confirmation,
/// PENDING -> CANCELLED on explicit rejection, PENDING -> EXPIRED on TTL.
/// Modeled as a logging-only enum; the store itself represents "pending"
/// as presence in the map and removes the entry on every other
/// transition, so there is never a stale non-pending entry to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Dispatched,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone)]
pub struct PendingAction {
    pub id: String,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub intent: IntentTag,
    pub fields: Value,
    /// Human-readable summary of what confirming this action will do —
    /// surfaced to the approver alongside the raw `fields`, e.g. "Send an
    /// email to Sarah: 'Quarterly report'".
    pub preview_text: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Outbound webhook payload, per §6.
#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub user_id: String,
    pub session_id: String,
    pub intent: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
    pub routing_info: Value,
}
