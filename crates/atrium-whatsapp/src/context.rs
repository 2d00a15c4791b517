use async_trait::async_trait;
use atrium_core::{SessionId, UserId};
use serde_json::Value;

/// Everything one call to [`WhatsAppContext::handle_message`] produces —
/// defined in this crate (not reused from the gateway's own turn-result
/// type) so the bridge never depends back on `atrium-gateway`.
#[derive(Debug, Clone)]
pub struct BridgeTurnResult {
    pub message: String,
    pub intent: String,
    pub needs_approval: bool,
    pub intent_data: Option<Value>,
    pub approval_info: Option<Value>,
}

/// Everything the bridge handlers need from the hosting gateway. The
/// gateway's `AppState` implements this; the bridge crate itself never
/// depends on `atrium-gateway`, avoiding a cycle — mirrors the teacher's
/// `MessageContext` seam in `app.rs`.
#[async_trait]
pub trait WhatsAppContext: Send + Sync + 'static {
    fn shared_token(&self) -> Option<String>;
    fn validate_identifier(&self) -> String;

    /// Runs a full turn (classify, route, reply) for the given session.
    async fn handle_message(&self, session_id: &SessionId, user_id: &UserId, text: &str) -> BridgeTurnResult;

    fn log_conversation(
        &self,
        session_id: &SessionId,
        platform: &str,
        payload: &Value,
        reply: &str,
        intent: &str,
        needs_approval: bool,
    );
    fn log_error(&self, session_id: &SessionId, platform: &str, error: &str);
}
