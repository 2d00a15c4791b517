use atrium_core::{IntentTag, SessionId, UserId};
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::types::PendingAction;

/// The PendingAction table, per §4.3/§5: a `DashMap` is the whole store —
/// "pending" is presence in the map, and every terminal transition
/// (dispatched, cancelled, expired) removes the entry. Last-write-wins is
/// correct here since only one action is ever pending per session at a
/// time in this gateway's flow.
///
/// Terminal actions aren't simply dropped: they move into `resolved`, a
/// tombstone map keyed by id. A second `/approve` call for an id already
/// resolved needs to answer `200` without dispatching the webhook twice —
/// without the tombstone, the second call would see an empty `actions` map
/// and have no way to distinguish "never existed" from "already handled".
pub struct PendingActionStore {
    actions: DashMap<String, PendingAction>,
    resolved: DashMap<String, PendingAction>,
    ttl_secs: i64,
}

impl PendingActionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            actions: DashMap::new(),
            resolved: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn create(
        &self,
        session_id: SessionId,
        user_id: UserId,
        intent: IntentTag,
        fields: Value,
        preview_text: String,
    ) -> PendingAction {
        let now = Utc::now();
        let action = PendingAction {
            id: Uuid::new_v4().to_string(),
            session_id,
            user_id,
            intent,
            fields,
            preview_text,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(self.ttl_secs),
        };
        self.actions.insert(action.id.clone(), action.clone());
        action
    }

    /// Removes and returns the action if present and not expired. Lazily
    /// evicts an expired entry it happens to find rather than returning it.
    pub fn take(&self, id: &str) -> Option<PendingAction> {
        let (_, action) = self.actions.remove(id)?;
        if action.expires_at < Utc::now() {
            None
        } else {
            Some(action)
        }
    }

    /// Finds the most recent still-pending action for a session without
    /// removing it — used to resolve a bare confirmation reply to the
    /// action it confirms.
    pub fn latest_for_session(&self, session_id: &SessionId) -> Option<PendingAction> {
        let now = Utc::now();
        self.actions
            .iter()
            .filter(|entry| &entry.session_id == session_id && entry.expires_at >= now)
            .map(|entry| entry.value().clone())
            .max_by_key(|a| a.created_at)
    }

    pub fn cancel(&self, id: &str) -> Option<PendingAction> {
        self.actions.remove(id).map(|(_, action)| action)
    }

    /// Marks a terminal action as resolved, so a later lookup by id for an
    /// action no longer in `actions` can still be answered.
    pub fn mark_resolved(&self, action: PendingAction) {
        self.resolved.insert(action.id.clone(), action);
    }

    pub fn resolved(&self, id: &str) -> Option<PendingAction> {
        self.resolved.get(id).map(|entry| entry.value().clone())
    }

    /// Sweeps every expired entry. Call periodically; also happens lazily
    /// on `take`.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .actions
            .iter()
            .filter(|e| e.expires_at < now)
            .map(|e| e.key().clone())
            .collect();
        for id in &expired {
            self.actions.remove(id);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> IntentTag {
        IntentTag::SendEmail
    }

    #[test]
    fn create_then_take_round_trips() {
        let store = PendingActionStore::new(1800);
        let action = store.create(SessionId::new("s1"), UserId::new("u1"), intent(), Value::Null, String::new());
        let taken = store.take(&action.id).unwrap();
        assert_eq!(taken.id, action.id);
        assert!(store.take(&action.id).is_none());
    }

    #[test]
    fn expired_action_is_not_returned() {
        let store = PendingActionStore::new(-1);
        let action = store.create(SessionId::new("s1"), UserId::new("u1"), intent(), Value::Null, String::new());
        assert!(store.take(&action.id).is_none());
    }

    #[test]
    fn cancel_removes_without_dispatch() {
        let store = PendingActionStore::new(1800);
        let action = store.create(SessionId::new("s1"), UserId::new("u1"), intent(), Value::Null, String::new());
        assert!(store.cancel(&action.id).is_some());
        assert!(store.take(&action.id).is_none());
    }

    #[test]
    fn resolved_tombstone_survives_after_take() {
        let store = PendingActionStore::new(1800);
        let action = store.create(SessionId::new("s1"), UserId::new("u1"), intent(), Value::Null, String::new());
        let taken = store.take(&action.id).unwrap();
        store.mark_resolved(taken);
        assert!(store.resolved(&action.id).is_some());
    }
}
