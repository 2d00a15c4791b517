use std::time::Instant;

use atrium_core::IntentTag;
use tracing::warn;

use crate::adapter::CredentialStore;
use crate::registry::{build_registry, ToolEntry};
use crate::types::{DispatchOutcome, DispatchRequest};

/// Direct-Automation Dispatcher: looks up the static registry entry for a
/// tag, short-circuits on the mail-auth gate, then runs the adapter under
/// its configured deadline and renders the templated reply, per §4.2.
pub struct Dispatcher {
    registry: Vec<ToolEntry>,
    credentials: Box<dyn CredentialStore>,
}

impl Dispatcher {
    pub fn new(credentials: Box<dyn CredentialStore>) -> Self {
        Self {
            registry: build_registry(),
            credentials,
        }
    }

    pub async fn dispatch(&self, tag: IntentTag, req: DispatchRequest) -> DispatchOutcome {
        let Some(entry) = self.registry.iter().find(|e| e.tag == tag) else {
            return DispatchOutcome {
                reply_text: "That isn't something I can do automatically yet.".to_string(),
                result_payload: serde_json::Value::Null,
                execution_ms: 0,
                ok: false,
                requires_auth: false,
            };
        };

        if tag.requires_mail_auth() && !self.credentials.has_mail_credentials(&req.user_id) {
            return DispatchOutcome {
                reply_text: "I need access to your mail account before I can do that — please connect Gmail first.".to_string(),
                result_payload: serde_json::Value::Null,
                execution_ms: 0,
                ok: false,
                requires_auth: true,
            };
        }

        let started = Instant::now();
        let deadline = std::time::Duration::from_secs(entry.deadline_secs);

        let outcome = match tokio::time::timeout(deadline, entry.adapter.call(&req)).await {
            Ok(Ok(payload)) => DispatchOutcome {
                reply_text: render(entry.success_template, &payload),
                result_payload: payload,
                execution_ms: started.elapsed().as_millis() as u64,
                ok: true,
                requires_auth: false,
            },
            Ok(Err(e)) => {
                warn!(tag = %tag, error = %e, "tool adapter failed");
                DispatchOutcome {
                    reply_text: entry.error_template.to_string(),
                    result_payload: serde_json::Value::Null,
                    execution_ms: started.elapsed().as_millis() as u64,
                    ok: false,
                    requires_auth: false,
                }
            }
            Err(_) => {
                warn!(tag = %tag, deadline_secs = entry.deadline_secs, "tool adapter timed out");
                DispatchOutcome {
                    reply_text: entry.error_template.to_string(),
                    result_payload: serde_json::Value::Null,
                    execution_ms: started.elapsed().as_millis() as u64,
                    ok: false,
                    requires_auth: false,
                }
            }
        };

        outcome
    }
}

/// Fills `{field}` placeholders in a template from a flat JSON object.
/// Unmatched placeholders are left as-is rather than panicking — adapters
/// and templates are both static, so a mismatch is a bug to be caught in
/// review, not a runtime condition to guard against.
fn render(template: &str, payload: &serde_json::Value) -> String {
    let mut out = template.to_string();
    if let Some(obj) = payload.as_object() {
        for (key, value) in obj {
            let placeholder = format!("{{{key}}}");
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&placeholder, &rendered);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::NoCredentials;

    fn request() -> DispatchRequest {
        DispatchRequest {
            session_id: "s1".to_string(),
            user_id: "u1".to_string(),
            parameters: Default::default(),
            context_snapshot: String::new(),
        }
    }

    #[tokio::test]
    async fn dispatches_weather_and_renders_template() {
        let dispatcher = Dispatcher::new(Box::new(NoCredentials));
        let outcome = dispatcher.dispatch(IntentTag::GetCurrentWeather, request()).await;
        assert!(outcome.ok);
        assert!(outcome.reply_text.contains("72"));
    }

    #[tokio::test]
    async fn mail_family_short_circuits_without_credentials() {
        let dispatcher = Dispatcher::new(Box::new(NoCredentials));
        let outcome = dispatcher.dispatch(IntentTag::CheckGmailInbox, request()).await;
        assert!(!outcome.ok);
        assert!(outcome.reply_text.to_lowercase().contains("connect gmail"));
    }

    #[tokio::test]
    async fn unknown_tag_in_registry_is_handled_gracefully() {
        let dispatcher = Dispatcher::new(Box::new(NoCredentials));
        let outcome = dispatcher.dispatch(IntentTag::GeneralChat, request()).await;
        assert!(!outcome.ok);
    }
}
