use atrium_core::{IntentTag, SessionId, UserId};
use serde_json::Value;
use tracing::info;

use crate::confirmation::{self, ConfirmationVerdict};
use crate::error::Result;
use crate::pending::PendingActionStore;
use crate::types::{ApprovalState, PendingAction};
use crate::webhook::WebhookDispatcher;

/// Outcome of feeding a reply through [`ApprovalPipeline::handle_reply`].
pub enum ReplyOutcome {
    /// The reply wasn't a yes/no answer to anything pending.
    NotHandled,
    Dispatched(PendingAction),
    Cancelled(PendingAction),
}

/// Outcome of an explicit `POST /approve` resolution by id, per §4.3's
/// at-most-once dispatch guarantee: resolving the same id twice is not an
/// error, the second call just reports `AlreadyResolved` instead of
/// dispatching (or cancelling) again.
pub enum ResolveOutcome {
    Dispatched(PendingAction),
    Cancelled(PendingAction),
    AlreadyResolved(PendingAction),
}

/// Orchestrates the state machine in §4.3: create a pending action when
/// the engine routes a turn to `approval_gated`, resolve a later short
/// reply into confirm/cancel, and dispatch the one outbound webhook call.
pub struct ApprovalPipeline {
    store: PendingActionStore,
    webhook: WebhookDispatcher,
}

impl ApprovalPipeline {
    pub fn new(ttl_secs: i64, webhook_url: Option<String>, bearer_token: Option<String>) -> Self {
        Self {
            store: PendingActionStore::new(ttl_secs),
            webhook: WebhookDispatcher::new(webhook_url, bearer_token),
        }
    }

    pub fn create_pending(
        &self,
        session_id: SessionId,
        user_id: UserId,
        intent: IntentTag,
        fields: Value,
        preview_text: String,
    ) -> PendingAction {
        self.store.create(session_id, user_id, intent, fields, preview_text)
    }

    /// Explicit resolution by action id — used by `POST /approve`. An
    /// `edited_data` override replaces `fields` before dispatch, letting an
    /// approver correct a draft (e.g. fix a typo'd recipient) without
    /// starting over.
    pub async fn confirm_by_id(&self, id: &str, edited_data: Option<Value>) -> Result<ResolveOutcome> {
        let Some(mut action) = self.store.take(id) else {
            return match self.store.resolved(id) {
                Some(action) => Ok(ResolveOutcome::AlreadyResolved(action)),
                None => Err(crate::error::ApprovalError::NotFound(id.to_string())),
            };
        };

        if let Some(edited) = edited_data {
            action.fields = edited;
        }

        // At-most-once: the action is already removed from the store above,
        // regardless of what the webhook call below does.
        if let Err(e) = self.webhook.dispatch(&action).await {
            info!(action_id = %action.id, error = %e, state = ?ApprovalState::Dispatched, "webhook dispatch failed after removal, not retried");
        }
        self.store.mark_resolved(action.clone());
        Ok(ResolveOutcome::Dispatched(action))
    }

    /// Explicit rejection by action id — used by `POST /approve` with
    /// `approved: false`.
    pub fn cancel_by_id(&self, id: &str) -> Result<ResolveOutcome> {
        let Some(action) = self.store.cancel(id) else {
            return match self.store.resolved(id) {
                Some(action) => Ok(ResolveOutcome::AlreadyResolved(action)),
                None => Err(crate::error::ApprovalError::NotFound(id.to_string())),
            };
        };
        self.store.mark_resolved(action.clone());
        Ok(ResolveOutcome::Cancelled(action))
    }

    /// Feeds a free-text reply through the confirmation predicate against
    /// the most recent pending action for the session.
    pub async fn handle_reply(&self, session_id: &SessionId, reply: &str) -> ReplyOutcome {
        let Some(candidate) = self.store.latest_for_session(session_id) else {
            return ReplyOutcome::NotHandled;
        };

        match confirmation::classify(reply) {
            ConfirmationVerdict::Confirmed => {
                let Some(action) = self.store.take(&candidate.id) else {
                    return ReplyOutcome::NotHandled;
                };
                if let Err(e) = self.webhook.dispatch(&action).await {
                    info!(action_id = %action.id, error = %e, "webhook dispatch failed after removal, not retried");
                }
                self.store.mark_resolved(action.clone());
                ReplyOutcome::Dispatched(action)
            }
            ConfirmationVerdict::Rejected => {
                self.store.cancel(&candidate.id);
                self.store.mark_resolved(candidate.clone());
                ReplyOutcome::Cancelled(candidate)
            }
            ConfirmationVerdict::NotAConfirmation => ReplyOutcome::NotHandled,
        }
    }

    pub fn sweep_expired(&self) -> usize {
        self.store.sweep_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{IntentTag, UserId};

    #[tokio::test]
    async fn confirm_reply_resolves_pending_action() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        pipeline.create_pending(SessionId::new("s1"), UserId::new("u1"), IntentTag::SendEmail, Value::Null, String::new());
        let outcome = pipeline.handle_reply(&SessionId::new("s1"), "yes send it").await;
        assert!(matches!(outcome, ReplyOutcome::Dispatched(_)));
    }

    #[tokio::test]
    async fn reject_reply_cancels_without_dispatch() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        pipeline.create_pending(SessionId::new("s1"), UserId::new("u1"), IntentTag::SendEmail, Value::Null, String::new());
        let outcome = pipeline.handle_reply(&SessionId::new("s1"), "no cancel").await;
        assert!(matches!(outcome, ReplyOutcome::Cancelled(_)));
    }

    #[tokio::test]
    async fn unrelated_reply_is_not_handled() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        pipeline.create_pending(SessionId::new("s1"), UserId::new("u1"), IntentTag::SendEmail, Value::Null, String::new());
        let outcome = pipeline.handle_reply(&SessionId::new("s1"), "what's the weather").await;
        assert!(matches!(outcome, ReplyOutcome::NotHandled));
    }

    #[tokio::test]
    async fn confirm_by_unknown_id_errors() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        assert!(pipeline.confirm_by_id("ghost", None).await.is_err());
    }

    #[tokio::test]
    async fn second_confirm_by_id_is_already_resolved_not_an_error() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        let action = pipeline.create_pending(
            SessionId::new("s1"),
            UserId::new("u1"),
            IntentTag::SendEmail,
            Value::Null,
            String::new(),
        );
        let first = pipeline.confirm_by_id(&action.id, None).await.unwrap();
        assert!(matches!(first, ResolveOutcome::Dispatched(_)));

        let second = pipeline.confirm_by_id(&action.id, None).await.unwrap();
        assert!(matches!(second, ResolveOutcome::AlreadyResolved(_)));
    }

    #[tokio::test]
    async fn edited_data_overrides_fields_before_dispatch() {
        let pipeline = ApprovalPipeline::new(1800, None, None);
        let action = pipeline.create_pending(
            SessionId::new("s1"),
            UserId::new("u1"),
            IntentTag::SendEmail,
            serde_json::json!({ "subject": "original" }),
            String::new(),
        );
        let edited = serde_json::json!({ "subject": "corrected" });
        let outcome = pipeline.confirm_by_id(&action.id, Some(edited.clone())).await.unwrap();
        match outcome {
            ResolveOutcome::Dispatched(resolved) => assert_eq!(resolved.fields, edited),
            _ => panic!("expected Dispatched"),
        }
    }
}
