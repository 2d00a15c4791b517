use serde_json::Value;

/// Result of one dispatch, per §4.2's `Dispatch` contract.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub reply_text: String,
    pub result_payload: Value,
    pub execution_ms: u64,
    pub ok: bool,
    /// Set when the mail-auth short-circuit fired — the caller needs
    /// delegated Gmail credentials it doesn't have yet. Surfaced up to
    /// `/chat`'s `intent_data.requires_auth` so a client knows to start an
    /// auth flow rather than retry the same request.
    pub requires_auth: bool,
}

/// Everything a [`crate::adapter::ToolAdapter`] needs about the turn that
/// triggered it.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub session_id: String,
    pub user_id: String,
    pub parameters: std::collections::BTreeMap<String, Value>,
    /// Markdown context snapshot from the context store, for adapters whose
    /// tool needs conversational grounding (none currently do, but the slot
    /// exists per §4.2's `context_snapshot` argument).
    pub context_snapshot: String,
}
