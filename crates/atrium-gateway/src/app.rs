use std::sync::Arc;

use async_trait::async_trait;
use atrium_approval::ApprovalPipeline;
use atrium_context::db::ChannelConversationRecord;
use atrium_context::{ColdStore, ContextStore};
use atrium_core::config::{AtriumConfig, ProviderEndpointConfig};
use atrium_core::error::{AtriumError, Result};
use atrium_core::{Channel, IntentDecision, IntentTag, RoutingLane, SessionId, Turn, UserId};
use atrium_dispatch::{adapter::NoCredentials, Dispatcher};
use atrium_engine::{content_extractor, IntentEngine};
use atrium_llm::mock::MockProvider;
use atrium_llm::{OpenAiCompatProvider, ProviderRouter, ProviderSlot};
use atrium_memory::{MemoryDecision, MemoryManager};
use atrium_whatsapp::{BridgeTurnResult, WhatsAppContext};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::http;

const DEFAULT_SYSTEM_PROMPT: &str = "You are Atrium, a helpful conversational assistant. \
Answer directly and concisely, drawing on anything you're told about the user below.";

/// Reply text produced for a turn that never reached classification,
/// because it resolved a pending approval instead.
fn approval_resolution_reply(intent: IntentTag, dispatched: bool) -> String {
    if dispatched {
        format!("Done — I've sent that off for {intent}.")
    } else {
        format!("Okay, I won't go ahead with that {intent}.")
    }
}

/// Builds the `fields` a pending action will carry plus a human-readable
/// `preview_text`, merging the classifier's `parameters` with whatever the
/// draft pass pulled out of a model reply via `content_extractor`.
fn build_approval_fields(decision: &IntentDecision, extracted: &content_extractor::ExtractedContent) -> (Value, String) {
    let mut fields = match serde_json::to_value(&decision.parameters) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    if let Some(recipient) = &extracted.recipient_name {
        fields.insert("recipient_name".to_string(), Value::String(recipient.clone()));
    }
    if let Some(subject) = &extracted.subject {
        fields.insert("subject".to_string(), Value::String(subject.clone()));
    }
    if !extracted.body.is_empty() {
        fields.insert("body".to_string(), Value::String(extracted.body.clone()));
    }
    if let Some(post_description) = &extracted.post_description {
        fields.insert("post_description".to_string(), Value::String(post_description.clone()));
    }
    if let Some(ai_instructions) = &extracted.ai_instructions {
        fields.insert("ai_instructions".to_string(), Value::String(ai_instructions.clone()));
    }

    let preview_text = match decision.intent_tag {
        IntentTag::SendEmail => {
            let recipient = fields.get("recipient_name").and_then(|v| v.as_str()).unwrap_or("the recipient");
            let subject = fields.get("subject").and_then(|v| v.as_str()).unwrap_or("(no subject)");
            format!("Send an email to {recipient} — subject: \"{subject}\"")
        }
        IntentTag::GeneratePostPromptPackage => {
            let description = fields
                .get("post_description")
                .and_then(|v| v.as_str())
                .unwrap_or(extracted.body.as_str());
            format!("Generate a post prompt package: {description}")
        }
        other => format!("Go ahead with {other}?"),
    };

    (Value::Object(fields), preview_text)
}

/// The classifier's `parameters` plus a `requires_auth` flag, as the
/// `intent_data` field of a chat/bridge reply.
fn merge_requires_auth(decision: &IntentDecision, requires_auth: bool) -> Value {
    let mut fields = match serde_json::to_value(&decision.parameters) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    fields.insert("requires_auth".to_string(), Value::Bool(requires_auth));
    Value::Object(fields)
}

/// Everything one call to [`AppState::handle_turn`] produces.
pub struct TurnResult {
    pub reply: String,
    pub intent: IntentTag,
    pub routing_lane: RoutingLane,
    pub needs_approval: bool,
    pub pending_action_id: Option<String>,
    /// Structured parameters the classifier/dispatcher extracted for this
    /// turn — `location`/`days` for a weather lookup, `requires_auth` for a
    /// mail-family tool that needs delegated credentials, etc.
    pub intent_data: Value,
}

/// Central shared state — passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: AtriumConfig,
    pub context: ContextStore,
    pub memory: MemoryManager,
    pub engine: IntentEngine,
    pub dispatcher: Dispatcher,
    pub approval: ApprovalPipeline,
}

impl AppState {
    pub fn new(config: AtriumConfig) -> Result<Self> {
        let cold = ColdStore::open(&config.gateway.database_path)
            .map_err(|e| AtriumError::StoreFatal(e.to_string()))?;
        let context = ContextStore::new(cold, config.context.warm_ttl_secs, config.context.max_warm_appends);

        let memory =
            MemoryManager::open(config.memory.path.clone()).map_err(|e| AtriumError::Internal(e.to_string()))?;

        let (fast_structured, fast_structured_model) = build_role(&config.providers.fast_structured, "fast_structured");
        let (high_fluency, high_fluency_model) = build_role(&config.providers.high_fluency, "high_fluency");
        let engine = IntentEngine::new(fast_structured, fast_structured_model, high_fluency, high_fluency_model);

        let dispatcher = Dispatcher::new(Box::new(NoCredentials));

        let approval = ApprovalPipeline::new(
            config.approval.pending_ttl_secs,
            config.approval.webhook_url.clone(),
            None,
        );

        Ok(Self {
            config,
            context,
            memory,
            engine,
            dispatcher,
            approval,
        })
    }

    /// Runs one full turn: resolves a pending approval reply if one is
    /// outstanding, otherwise classifies and routes per §4.1.
    pub async fn handle_turn(&self, session_id: &SessionId, user_id: &UserId, channel: Channel, text: &str) -> TurnResult {
        match self.approval.handle_reply(session_id, text).await {
            atrium_approval::ReplyOutcome::Dispatched(action) => {
                let reply = approval_resolution_reply(action.intent, true);
                self.record_turn(session_id, user_id, channel, text, &reply, action.intent, RoutingLane::ApprovalGated, false);
                return TurnResult {
                    reply,
                    intent: action.intent,
                    routing_lane: RoutingLane::ApprovalGated,
                    needs_approval: false,
                    pending_action_id: None,
                    intent_data: action.fields,
                };
            }
            atrium_approval::ReplyOutcome::Cancelled(action) => {
                let reply = approval_resolution_reply(action.intent, false);
                self.record_turn(session_id, user_id, channel, text, &reply, action.intent, RoutingLane::ApprovalGated, false);
                return TurnResult {
                    reply,
                    intent: action.intent,
                    routing_lane: RoutingLane::ApprovalGated,
                    needs_approval: false,
                    pending_action_id: None,
                    intent_data: action.fields,
                };
            }
            atrium_approval::ReplyOutcome::NotHandled => {}
        }

        let decision = self.engine.classify(session_id, text).await;

        if self.config.features.semantic_memory_enabled {
            self.apply_memory(session_id, text);
        }

        let (reply, needs_approval, pending_action_id, intent_data) = match decision.routing_lane {
            RoutingLane::DirectAuto if self.config.features.direct_automation_enabled => {
                let context_snapshot = self.context.get_context_for_prompt(session_id).await.unwrap_or_default();
                let req = atrium_dispatch::DispatchRequest {
                    session_id: session_id.as_str().to_string(),
                    user_id: user_id.as_str().to_string(),
                    parameters: decision.parameters.clone(),
                    context_snapshot,
                };
                let outcome = self.dispatcher.dispatch(decision.intent_tag, req).await;
                let intent_data = merge_requires_auth(&decision, outcome.requires_auth);
                (outcome.reply_text, false, None, intent_data)
            }
            RoutingLane::DirectAuto => {
                let intent_data = merge_requires_auth(&decision, false);
                ("Direct automation is disabled on this deployment.".to_string(), false, None, intent_data)
            }
            RoutingLane::ApprovalGated => {
                let system_prompt = self.build_system_prompt(session_id).await;
                let extracted = self.engine.render_approval_draft(&system_prompt, text).await;
                let (fields, preview_text) = build_approval_fields(&decision, &extracted);
                let action = self.approval.create_pending(
                    session_id.clone(),
                    user_id.clone(),
                    decision.intent_tag,
                    fields.clone(),
                    preview_text.clone(),
                );
                (
                    format!("{preview_text} — reply \"yes\" to confirm or \"no\" to cancel."),
                    true,
                    Some(action.id),
                    fields,
                )
            }
            RoutingLane::LlmReply => {
                let system_prompt = self.build_system_prompt(session_id).await;
                let reply = self.engine.render_reply(&decision, &system_prompt, text).await;
                let intent_data = merge_requires_auth(&decision, false);
                (reply, false, None, intent_data)
            }
        };

        self.record_turn(
            session_id,
            user_id,
            channel,
            text,
            &reply,
            decision.intent_tag,
            decision.routing_lane,
            needs_approval,
        );

        TurnResult {
            reply,
            intent: decision.intent_tag,
            routing_lane: decision.routing_lane,
            needs_approval,
            pending_action_id,
            intent_data,
        }
    }

    async fn build_system_prompt(&self, session_id: &SessionId) -> String {
        let mut system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
        let memory_ctx = self.memory.context_for_ai();
        if !memory_ctx.is_empty() {
            system_prompt.push_str("\n\n# What you know about this user\n");
            system_prompt.push_str(&memory_ctx);
        }
        if let Ok(conv_ctx) = self.context.get_context_for_prompt(session_id).await {
            if !conv_ctx.is_empty() {
                system_prompt.push_str("\n\n# Conversation so far\n");
                system_prompt.push_str(&conv_ctx);
            }
        }
        system_prompt
    }

    fn apply_memory(&self, session_id: &SessionId, text: &str) {
        match MemoryManager::classify(text) {
            MemoryDecision::Store => {
                if let Err(e) = self.memory.process_store(text, session_id.as_str()) {
                    warn!(error = %e, "failed to store semantic fact");
                }
            }
            MemoryDecision::Forget => {
                if let Err(e) = self.memory.process_forget(text) {
                    warn!(error = %e, "failed to process forget request");
                }
            }
            MemoryDecision::Recall | MemoryDecision::None => {}
        }
    }

    fn record_turn(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        channel: Channel,
        user_text: &str,
        ai_text: &str,
        intent: IntentTag,
        routing: RoutingLane,
        needs_approval: bool,
    ) {
        let turn = Turn {
            id: Turn::new_id(),
            session_id: session_id.clone(),
            user_id: user_id.clone(),
            channel,
            user_text: user_text.to_string(),
            ai_text: ai_text.to_string(),
            intent,
            routing,
            needs_approval,
            created_at: Utc::now(),
        };
        if let Err(e) = self.context.insert_turn(&turn) {
            warn!(error = %e, "failed to persist turn");
        }
    }
}

#[async_trait]
impl WhatsAppContext for AppState {
    fn shared_token(&self) -> Option<String> {
        self.config.whatsapp.shared_token.clone()
    }

    fn validate_identifier(&self) -> String {
        self.config.whatsapp.validate_identifier.clone()
    }

    async fn handle_message(&self, session_id: &SessionId, user_id: &UserId, text: &str) -> BridgeTurnResult {
        let result = self.handle_turn(session_id, user_id, Channel::Whatsapp, text).await;
        let approval_info = result
            .pending_action_id
            .as_ref()
            .map(|id| serde_json::json!({ "pending_action_id": id }));
        BridgeTurnResult {
            message: result.reply,
            intent: result.intent.as_str().to_string(),
            needs_approval: result.needs_approval,
            intent_data: Some(result.intent_data),
            approval_info,
        }
    }

    fn log_conversation(
        &self,
        session_id: &SessionId,
        platform: &str,
        payload: &Value,
        reply: &str,
        intent: &str,
        needs_approval: bool,
    ) {
        let record = ChannelConversationRecord {
            platform: platform.to_string(),
            session_id: session_id.clone(),
            user_message: payload.to_string(),
            ai_response: reply.to_string(),
            intent: intent.to_string(),
            needs_approval,
            created_at: Utc::now(),
        };
        if let Err(e) = self.context.log_channel_conversation(&record) {
            warn!(error = %e, "failed to log channel conversation");
        }
    }

    fn log_error(&self, session_id: &SessionId, platform: &str, error: &str) {
        if let Err(e) = self.context.log_channel_error(session_id, platform, error) {
            warn!(error = %e, "failed to log channel error");
        }
    }
}

fn build_role(cfg: &Option<ProviderEndpointConfig>, role_name: &str) -> (ProviderRouter, String) {
    match cfg {
        Some(c) => {
            let provider = OpenAiCompatProvider::new(role_name, c.api_key.clone(), c.base_url.clone(), c.chat_path.clone());
            let slot = ProviderSlot::new(Box::new(provider), c.max_retries);
            (ProviderRouter::new(vec![slot]), c.model.clone())
        }
        None => {
            warn!("no {role_name} provider configured, falling back to a canned mock provider");
            let mock = MockProvider::new(role_name, "I don't have a live model configured right now.");
            (ProviderRouter::new(vec![ProviderSlot::new(Box::new(mock), 0)]), "mock".to_string())
        }
    }
}

/// Assembles the full Axum router: the gateway's own HTTP API plus the
/// WhatsApp bridge mounted at its own prefix.
pub fn build_router(state: Arc<AppState>) -> Router {
    let main = Router::new()
        .route("/health", get(http::health::health_handler))
        .route("/chat", post(http::chat::chat_handler))
        .route("/approve", post(http::approve::approve_handler))
        .route(
            "/history/{session_id}",
            get(http::history::history_handler).delete(http::history::delete_history_handler),
        )
        .route("/memory/stats", get(http::memory::stats_handler))
        .route("/memory/process", post(http::memory::process_handler))
        .route("/memory/context", get(http::memory::context_handler))
        .route("/mcp/read-context/{session_id}", get(http::mcp::read_context_handler))
        .route("/mcp/write-context", post(http::mcp::write_context_handler))
        .route("/mcp/append-context", post(http::mcp::append_context_handler))
        .with_state(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http());

    main.merge(atrium_whatsapp::build_router(state))
}
