use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApprovalError, Result};
use crate::types::{PendingAction, WebhookPayload};

/// 30s deadline for the outbound webhook call, per §5.
const WEBHOOK_DEADLINE_SECS: u64 = 30;

pub struct WebhookDispatcher {
    client: Client,
    url: Option<String>,
    bearer_token: Option<String>,
}

impl WebhookDispatcher {
    pub fn new(url: Option<String>, bearer_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            bearer_token,
        }
    }

    /// Sends the confirmed action to the configured webhook URL. The
    /// caller removes the `PendingAction` from the store before calling
    /// this (or regardless of its result) — at-most-once dispatch means a
    /// webhook failure is logged, never retried from here, per §4.3.
    pub async fn dispatch(&self, action: &PendingAction) -> Result<()> {
        let url = self.url.as_ref().ok_or(ApprovalError::NoWebhookConfigured)?;

        let payload = WebhookPayload {
            user_id: action.user_id.as_str().to_string(),
            session_id: action.session_id.as_str().to_string(),
            intent: action.intent.as_str().to_string(),
            data: action.fields.clone(),
            timestamp: action.created_at,
            routing_info: serde_json::json!({ "routing_lane": "approval_gated" }),
        };

        let mut req = self.client.post(url).json(&payload).timeout(Duration::from_secs(WEBHOOK_DEADLINE_SECS));
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(action_id = %action.id, "approval webhook dispatched");
                Ok(())
            }
            Ok(resp) => {
                warn!(action_id = %action.id, status = %resp.status(), "approval webhook rejected");
                Err(ApprovalError::WebhookFailed(format!("status {}", resp.status())))
            }
            Err(e) => {
                warn!(action_id = %action.id, error = %e, "approval webhook request failed");
                Err(ApprovalError::WebhookFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{IntentTag, SessionId, UserId};

    #[tokio::test]
    async fn missing_url_is_a_clean_error() {
        let dispatcher = WebhookDispatcher::new(None, None);
        let action = PendingAction {
            id: "a1".to_string(),
            session_id: SessionId::new("s1"),
            user_id: UserId::new("u1"),
            intent: IntentTag::SendEmail,
            fields: Value::Null,
            preview_text: String::new(),
            created_at: chrono::Utc::now(),
            expires_at: chrono::Utc::now(),
        };
        let err = dispatcher.dispatch(&action).await.unwrap_err();
        assert!(matches!(err, ApprovalError::NoWebhookConfigured));
    }
}
