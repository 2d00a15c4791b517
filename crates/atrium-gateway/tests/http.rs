//! End-to-end HTTP tests driven through `tower::ServiceExt::oneshot`,
//! against a router built on mocked providers — no live model, no network.

use std::sync::Arc;

use async_trait::async_trait;
use atrium_approval::ApprovalPipeline;
use atrium_context::{ColdStore, ContextStore};
use atrium_core::config::AtriumConfig;
use atrium_dispatch::{adapter::NoCredentials, Dispatcher};
use atrium_engine::IntentEngine;
use atrium_gateway::app::{build_router, AppState};
use atrium_llm::mock::MockProvider;
use atrium_llm::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};
use atrium_llm::{ProviderRouter, ProviderSlot};
use atrium_memory::MemoryManager;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

/// A provider an outside test can keep pushing canned replies into after
/// it's already been boxed into a [`ProviderSlot`] — `MockProvider`'s own
/// methods take `&self`, so a shared `Arc` handle survives the move.
struct SharedMock(Arc<MockProvider>);

#[async_trait]
impl LlmProvider for SharedMock {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.0.send(req).await
    }
}

struct Harness {
    fast_structured: Arc<MockProvider>,
    high_fluency: Arc<MockProvider>,
    _memory_dir: tempfile::TempDir,
}

impl Harness {
    fn router(&self) -> axum::Router {
        let cold = ColdStore::in_memory().unwrap();
        let context = ContextStore::new(cold, 24 * 60 * 60, 100);

        let memory_path = self._memory_dir.path().join("semantic_memory.json");
        let memory = MemoryManager::open(&memory_path).unwrap();

        let fast_router = ProviderRouter::new(vec![ProviderSlot::new(
            Box::new(SharedMock(self.fast_structured.clone())),
            0,
        )]);
        let high_router = ProviderRouter::new(vec![ProviderSlot::new(
            Box::new(SharedMock(self.high_fluency.clone())),
            0,
        )]);
        let engine = IntentEngine::new(fast_router, "mock-fast", high_router, "mock-high");

        let dispatcher = Dispatcher::new(Box::new(NoCredentials));
        let approval = ApprovalPipeline::new(30 * 60, None, None);

        let state = Arc::new(AppState {
            config: AtriumConfig::default(),
            context,
            memory,
            engine,
            dispatcher,
            approval,
        });
        build_router(state)
    }
}

fn harness() -> Harness {
    Harness {
        fast_structured: Arc::new(MockProvider::new("mock-fast", classifier_default())),
        high_fluency: Arc::new(MockProvider::new("mock-high", "I'm not sure how to help with that.")),
        _memory_dir: tempfile::tempdir().unwrap(),
    }
}

/// A well-formed but low-signal stage-2 JSON response, returned whenever a
/// test doesn't push its own canned classification ahead of a request.
fn classifier_default() -> String {
    json!({
        "intent_tag": "general_chat",
        "parameters": {},
        "confidence": 0.5,
        "explanation": "default",
        "dimensions": {
            "emotional_complexity": "low",
            "professional_tone_required": false,
            "creative_requirement": "none",
            "technical_complexity": "simple",
            "response_length": "short",
            "engagement_level": "conversational",
            "context_dependency": "none",
            "reasoning_type": "logical"
        }
    })
    .to_string()
}

fn classification_json(tag: &str, parameters: Value) -> String {
    json!({
        "intent_tag": tag,
        "parameters": parameters,
        "confidence": 0.9,
        "explanation": "test fixture",
        "dimensions": {
            "emotional_complexity": "low",
            "professional_tone_required": false,
            "creative_requirement": "none",
            "technical_complexity": "simple",
            "response_length": "short",
            "engagement_level": "conversational",
            "context_dependency": "none",
            "reasoning_type": "logical"
        }
    })
    .to_string()
}

async fn post_json(router: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &axum::Router, path: &str) -> (StatusCode, Value) {
    let req = Request::builder().method("GET").uri(path).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_check_reports_ok() {
    let router = harness().router();
    let (status, _body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let router = harness().router();
    let (status, body) = post_json(&router, "/chat", json!({"message": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn plain_chat_goes_through_llm_reply() {
    let h = harness();
    h.high_fluency.push_ok("Sure, here's a fun fact about otters.");
    let router = h.router();

    let (status, body) = post_json(
        &router,
        "/chat",
        json!({"message": "tell me something interesting", "session_id": "s1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Sure, here's a fun fact about otters.");
    assert_eq!(body["needs_approval"], false);
    assert_eq!(body["session_id"], "s1");
}

#[tokio::test]
async fn weather_forecast_mentions_location_and_a_percentage() {
    let h = harness();
    h.fast_structured
        .push_ok(classification_json("get_weather_forecast", json!({"location": "Delhi", "days": 2})));
    let router = h.router();

    let (status, body) = post_json(
        &router,
        "/chat",
        json!({"message": "what's the weather forecast for tomorrow", "session_id": "s2"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reply = body["response"].as_str().unwrap();
    assert!(reply.contains("Delhi"));
    assert!(reply.contains('%'));
    assert!(reply.to_lowercase().contains("yes") || reply.to_lowercase().contains("no"));
    assert_eq!(body["needs_approval"], false);
}

#[tokio::test]
async fn send_email_is_approval_gated_and_resolves_idempotently() {
    let h = harness();
    h.high_fluency
        .push_ok("Recipient: Jordan\nSubject: Project update\nBody: Hi Jordan, quick status update attached.");
    let router = h.router();

    let (status, body) = post_json(
        &router,
        "/chat",
        json!({"message": "send an email to jordan about the project", "session_id": "s3"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["needs_approval"], true);
    let action_id = body["id"].as_str().unwrap().to_string();
    assert!(body["response"].as_str().unwrap().contains("Jordan"));

    let (status, approve_body) = post_json(
        &router,
        "/approve",
        json!({"message_id": action_id, "approved": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approve_body["dispatched"], true);
    assert_eq!(approve_body["already_resolved"], false);

    let (status, second_body) = post_json(
        &router,
        "/approve",
        json!({"message_id": action_id, "approved": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second_body["already_resolved"], true);
    assert_eq!(second_body["dispatched"], false);
}

#[tokio::test]
async fn approving_an_unknown_id_is_a_404() {
    let router = harness().router();
    let (status, _body) = post_json(
        &router,
        "/approve",
        json!({"message_id": "does-not-exist", "approved": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_round_trips_as_flattened_messages() {
    let h = harness();
    h.high_fluency.push_ok("Hi there!");
    let router = h.router();

    let (_status, _body) = post_json(
        &router,
        "/chat",
        json!({"message": "hello", "session_id": "history-session"}),
    )
    .await;

    let (status, body) = get(&router, "/history/history-session").await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["isUser"], true);
    assert_eq!(messages[0]["text"], "hello");
    assert_eq!(messages[1]["isUser"], false);
    assert_eq!(messages[1]["text"], "Hi there!");
}

#[tokio::test]
async fn history_for_unknown_session_is_empty_not_an_error() {
    let router = harness().router();
    let (status, body) = get(&router, "/history/never-seen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn memory_process_store_then_recall_round_trips() {
    let router = harness().router();

    let (status, store_body) = post_json(
        &router,
        "/memory/process",
        json!({"message": "i like dark roast coffee", "session_id": "mem1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store_body["decision"], "Store");
    assert!(store_body["fact"].is_object());

    let (status, recall_body) = post_json(
        &router,
        "/memory/process",
        json!({"message": "what do you know about me?", "session_id": "mem1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recall_body["decision"], "Recall");
    let facts = recall_body["facts"].as_array().unwrap();
    assert_eq!(facts.len(), 1);
    assert!(facts[0]["content"].as_str().unwrap().contains("coffee"));
}
