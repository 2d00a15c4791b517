use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::provider::{ChatRequest, ChatResponse, LlmProvider, ProviderError};

/// Generic OpenAI-wire-compatible provider. Both the `fast_structured` and
/// `high_fluency` roles are instances of this struct pointed at different
/// base URLs / models — the concrete provider identity (Anthropic, a local
/// Ollama, a hosted OpenAI-compatible gateway) is a deployment detail the
/// engine and dispatcher never see.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    provider_name: String,
    api_key: String,
    base_url: String,
    chat_path: String,
}

impl OpenAiCompatProvider {
    /// `base_url` must not have a trailing slash. `chat_path` must start
    /// with `/` (e.g. `/v1/chat/completions`).
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        chat_path: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider_name: name.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            chat_path: chat_path.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = build_request_body(req);
        let url = format!("{}{}", self.base_url, self.chat_path);

        debug!(model = %req.model, provider = %self.provider_name, "sending chat request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry_after_ms = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited { retry_after_ms });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, provider = %self.provider_name, "provider API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parse_response(api_resp))
    }
}

fn build_request_body(req: &ChatRequest) -> serde_json::Value {
    let mut messages = vec![serde_json::json!({
        "role": "system",
        "content": req.system,
    })];
    for m in &req.messages {
        messages.push(serde_json::json!({
            "role": m.role,
            "content": m.content,
        }));
    }

    let mut body = serde_json::json!({
        "model": req.model,
        "messages": messages,
        "max_tokens": req.max_tokens,
        "stream": false,
    });

    if req.json_mode {
        body["response_format"] = serde_json::json!({ "type": "json_object" });
    }

    body
}

fn parse_response(resp: ApiResponse) -> ChatResponse {
    let choice = resp.choices.into_iter().next();
    let content = choice
        .as_ref()
        .and_then(|c| c.message.content.as_deref())
        .unwrap_or("")
        .to_string();
    let stop_reason = choice.and_then(|c| c.finish_reason).unwrap_or_default();

    ChatResponse {
        content,
        model: resp.model,
        tokens_in: resp.usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
        tokens_out: resp.usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0),
        stop_reason,
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_body_includes_json_mode_hint() {
        let req = ChatRequest::new("gpt", "sys").with_user("hi");
        let mut req = req;
        req.json_mode = true;
        let body = build_request_body(&req);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn parse_response_defaults_missing_usage_to_zero() {
        let resp = ApiResponse {
            model: "gpt".into(),
            choices: vec![ApiChoice {
                message: ApiMessage {
                    content: Some("hello".into()),
                },
                finish_reason: Some("stop".into()),
            }],
            usage: None,
        };
        let parsed = parse_response(resp);
        assert_eq!(parsed.content, "hello");
        assert_eq!(parsed.tokens_in, 0);
    }
}
