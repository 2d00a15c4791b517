use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound payload from the WhatsApp bridge. Field names are tolerant —
/// the bridge's own upstream integration has used `message`, `text`,
/// `query`, and `content` interchangeably across versions, per §4.6.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IncomingPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl IncomingPayload {
    pub fn extract_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.text.as_deref())
            .or(self.query.as_deref())
            .or(self.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Reply envelope sent back to the bridge, per §4.6. `session_id` is the
/// raw, unprefixed id the bridge sent (or auto-assigned id) — never the
/// `whatsapp_`-namespaced id used internally for session routing.
#[derive(Debug, Serialize)]
pub struct OutgoingEnvelope {
    pub success: bool,
    pub session_id: String,
    pub message: String,
    pub intent: String,
    pub needs_approval: bool,
    pub platform: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_info: Option<Value>,
}

/// Wraps a raw-string (non-JSON-object) body into the same shape an object
/// payload would have taken, per §9 Open Question 4.
pub fn wrap_raw_body(raw: &str) -> Value {
    serde_json::json!({ "message": raw })
}
