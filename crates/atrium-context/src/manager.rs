use std::fmt::Write as _;
use std::sync::Arc;

use atrium_core::SessionId;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

use crate::db::ColdStore;
use crate::error::Result;
use crate::hot::HotStore;
use crate::types::{AppendedResult, ContextEnvelope, ContextSnapshot};
use crate::warm::WarmStore;

/// Bound on `chat_history` entries inside a single envelope before the
/// oldest are trimmed, per §4.4 "Bounded payload size".
const MAX_CHAT_HISTORY_ENTRIES: usize = 50;

/// The Multi-Tier Context Store. Owns hot, warm and cold tiers and
/// implements the four operations of §4.4. Cold is the source of truth;
/// warm is repopulated from cold on miss; hot is a pure best-effort
/// accelerator in front of warm.
pub struct ContextStore {
    hot: HotStore,
    warm: WarmStore,
    cold: ColdStore,
    /// Per-session write lock — concurrent writes to the same session are
    /// serialised here to preserve append order; cross-session writes are
    /// independent, per §4.4 "Concurrency" / §5.
    write_locks: DashMap<SessionId, Arc<AsyncMutex<()>>>,
}

impl ContextStore {
    pub fn new(cold: ColdStore, warm_ttl_secs: i64, max_warm_appends: usize) -> Self {
        Self {
            hot: HotStore::new(),
            warm: WarmStore::new(warm_ttl_secs, max_warm_appends),
            cold,
            write_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, session_id: &SessionId) -> Arc<AsyncMutex<()>> {
        self.write_locks
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Upserts warm + cold. If the cold write succeeds the warm copy is
    /// refreshed; if the warm write fails (it can't here, but a remote
    /// warm backend could), cold remains authoritative and the next read
    /// repopulates warm on miss — matching §9's "best-effort writes to
    /// multiple stores" pattern.
    pub async fn write_context(&self, mut envelope: ContextEnvelope) -> Result<()> {
        let lock = self.lock_for(&envelope.session_id);
        let _guard = lock.lock().await;

        if envelope.payload.chat_history.len() > MAX_CHAT_HISTORY_ENTRIES {
            let overflow = envelope.payload.chat_history.len() - MAX_CHAT_HISTORY_ENTRIES;
            envelope.payload.chat_history.drain(0..overflow);
        }

        self.cold.upsert_envelope(&envelope)?;
        self.warm.set_envelope(envelope.clone());
        self.hot.set(envelope);
        Ok(())
    }

    /// Pushes to the warm list (bounded) and the cold collection
    /// (unbounded, paginated reads), ordered by arrival.
    pub async fn append_context(&self, append: AppendedResult) -> Result<()> {
        let lock = self.lock_for(&append.session_id);
        let _guard = lock.lock().await;

        self.cold.append(&append)?;
        self.warm.push_append(&append.session_id, append);
        Ok(())
    }

    /// Warm first; on miss, cold. Returns `not_found` (empty snapshot with
    /// `total == 0` and `envelope == None`) only if both are empty.
    pub async fn read_context(&self, session_id: &SessionId) -> Result<ContextSnapshot> {
        if let Some(envelope) = self.hot.get(session_id).or_else(|| self.warm.get_envelope(session_id)) {
            self.hot.set(envelope.clone());
            let appends = self.warm_or_cold_appends(session_id)?;
            return Ok(ContextSnapshot {
                last_updated: Some(envelope.created_at),
                expires_at: Some(envelope.expires_at),
                total: appends.len(),
                envelope: Some(envelope),
                appends,
            });
        }

        // Warm miss — fall back to cold, the authoritative tier.
        match self.cold.read_envelope(session_id) {
            Ok(Some(envelope)) => {
                self.warm.set_envelope(envelope.clone());
                self.hot.set(envelope.clone());
                let appends = self.warm_or_cold_appends(session_id)?;
                Ok(ContextSnapshot {
                    last_updated: Some(envelope.created_at),
                    expires_at: Some(envelope.expires_at),
                    total: appends.len(),
                    envelope: Some(envelope),
                    appends,
                })
            }
            Ok(None) => {
                let appends = self.warm_or_cold_appends(session_id)?;
                Ok(ContextSnapshot {
                    envelope: None,
                    total: appends.len(),
                    last_updated: None,
                    expires_at: None,
                    appends,
                })
            }
            Err(e) => {
                // §7 StoreFatal: cold unreachable. Degrade to whatever warm
                // had, never surface a bare error from this layer.
                warn!(error = %e, "cold tier unreachable during read_context, degrading to warm-only");
                let appends = self.warm.get_appends(session_id);
                Ok(ContextSnapshot {
                    envelope: None,
                    total: appends.len(),
                    last_updated: None,
                    expires_at: None,
                    appends,
                })
            }
        }
    }

    fn warm_or_cold_appends(&self, session_id: &SessionId) -> Result<Vec<AppendedResult>> {
        let warm = self.warm.get_appends(session_id);
        if !warm.is_empty() {
            return Ok(warm);
        }
        self.cold.read_appends(session_id, 100, 0)
    }

    pub async fn delete_context(&self, session_id: &SessionId) -> Result<()> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        self.hot.delete(session_id);
        self.warm.delete(session_id);
        self.cold.delete_session(session_id)?;
        Ok(())
    }

    /// Compact Markdown summary for prepending to an LLM prompt: the most
    /// recent 5 chat turns, current intent, and up to 3 append outputs.
    pub async fn get_context_for_prompt(&self, session_id: &SessionId) -> Result<String> {
        let snapshot = self.read_context(session_id).await?;
        let mut out = String::new();

        if let Some(envelope) = &snapshot.envelope {
            let _ = writeln!(out, "## Current intent\n{}", envelope.intent_tag);
            let recent = envelope
                .payload
                .chat_history
                .iter()
                .rev()
                .take(5)
                .collect::<Vec<_>>();
            if !recent.is_empty() {
                let _ = writeln!(out, "\n## Recent turns");
                for entry in recent.into_iter().rev() {
                    let _ = writeln!(out, "- User: {}", entry.user_text);
                    let _ = writeln!(out, "  Assistant: {}", entry.ai_text);
                }
            }
        }

        if !snapshot.appends.is_empty() {
            let _ = writeln!(out, "\n## Recent tool/approval outputs");
            for append in snapshot.appends.iter().rev().take(3) {
                let _ = writeln!(out, "- [{:?}] {}", append.source, append.output);
            }
        }

        Ok(out)
    }

    pub fn insert_turn(&self, turn: &atrium_core::Turn) -> Result<()> {
        self.cold.insert_turn(turn)
    }

    pub fn list_turns(&self, session_id: &SessionId) -> Result<Vec<atrium_core::Turn>> {
        self.cold.list_turns(session_id)
    }

    pub fn delete_turns(&self, session_id: &SessionId) -> Result<()> {
        self.cold.delete_session(session_id)
    }

    pub fn log_channel_conversation(&self, record: &crate::db::ChannelConversationRecord) -> Result<()> {
        self.cold.log_channel_conversation(record)
    }

    pub fn log_channel_error(&self, session_id: &SessionId, platform: &str, error: &str) -> Result<()> {
        self.cold.log_channel_error(session_id, platform, error)
    }

    pub fn now() -> chrono::DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{IntentTag, UserId};

    fn store() -> ContextStore {
        ContextStore::new(ColdStore::in_memory().unwrap(), 3600, 100)
    }

    fn envelope(session: &str) -> ContextEnvelope {
        ContextEnvelope {
            session_id: SessionId::new(session),
            user_id: UserId::new("u1"),
            intent_tag: IntentTag::GeneralChat,
            payload: Default::default(),
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = store();
        store.write_context(envelope("s1")).await.unwrap();
        let snapshot = store.read_context(&SessionId::new("s1")).await.unwrap();
        assert!(snapshot.envelope.is_some());
        assert_eq!(snapshot.envelope.unwrap().session_id, SessionId::new("s1"));
    }

    #[tokio::test]
    async fn read_missing_session_returns_empty_snapshot() {
        let store = store();
        let snapshot = store.read_context(&SessionId::new("ghost")).await.unwrap();
        assert!(snapshot.envelope.is_none());
        assert_eq!(snapshot.total, 0);
    }

    #[tokio::test]
    async fn appends_preserve_arrival_order() {
        let store = store();
        let session = SessionId::new("s1");
        for i in 0..2 {
            store
                .append_context(AppendedResult {
                    session_id: session.clone(),
                    append_id: format!("a{i}"),
                    source: crate::types::AppendSource::Tool,
                    output: serde_json::json!({ "i": i }),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let snapshot = store.read_context(&session).await.unwrap();
        assert_eq!(snapshot.appends[0].append_id, "a0");
        assert_eq!(snapshot.appends[1].append_id, "a1");
    }

    #[tokio::test]
    async fn delete_removes_from_all_tiers() {
        let store = store();
        let session = SessionId::new("s1");
        store.write_context(envelope("s1")).await.unwrap();
        store.delete_context(&session).await.unwrap();
        let snapshot = store.read_context(&session).await.unwrap();
        assert!(snapshot.envelope.is_none());
    }
}
