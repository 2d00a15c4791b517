use std::time::{Duration, Instant};

use atrium_core::SessionId;
use dashmap::DashMap;

use crate::types::{AppendedResult, ContextEnvelope};

struct TtlEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Key-value cache with TTL — the primary read path per §4.4. A process-
/// local implementation backed by `dashmap`; an external cache (Redis or
/// similar) is a deployment detail this system's interface doesn't
/// prescribe, matching §1's exclusion of "concrete HTTP framing" for
/// external infra.
///
/// Keys mirror the persisted layout of §6: `ctx:<session_id>` and
/// `app:<session_id>`, here modelled as two separate maps rather than one
/// string-keyed map, since the value shapes differ.
pub struct WarmStore {
    envelopes: DashMap<SessionId, TtlEntry<ContextEnvelope>>,
    appends: DashMap<SessionId, TtlEntry<Vec<AppendedResult>>>,
    ttl: Duration,
    max_appends: usize,
}

impl WarmStore {
    pub fn new(ttl_secs: i64, max_appends: usize) -> Self {
        Self {
            envelopes: DashMap::new(),
            appends: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs.max(0) as u64),
            max_appends,
        }
    }

    pub fn set_envelope(&self, envelope: ContextEnvelope) {
        let key = envelope.session_id.clone();
        self.envelopes.insert(
            key,
            TtlEntry {
                value: envelope,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Returns `None` on miss or expiry — the caller repopulates from cold.
    pub fn get_envelope(&self, session_id: &SessionId) -> Option<ContextEnvelope> {
        let entry = self.envelopes.get(session_id)?;
        if entry.expires_at < Instant::now() {
            drop(entry);
            self.envelopes.remove(session_id);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Pushes an append, bounding the list to `max_appends` (oldest evicted
    /// first) per §4.4's "bounded 100" rule.
    pub fn push_append(&self, session_id: &SessionId, append: AppendedResult) {
        let mut entry = self.appends.entry(session_id.clone()).or_insert_with(|| TtlEntry {
            value: Vec::new(),
            expires_at: Instant::now() + self.ttl,
        });
        entry.value.push(append);
        if entry.value.len() > self.max_appends {
            let overflow = entry.value.len() - self.max_appends;
            entry.value.drain(0..overflow);
        }
        entry.expires_at = Instant::now() + self.ttl;
    }

    pub fn get_appends(&self, session_id: &SessionId) -> Vec<AppendedResult> {
        match self.appends.get(session_id) {
            Some(entry) if entry.expires_at >= Instant::now() => entry.value.clone(),
            Some(_) => {
                self.appends.remove(session_id);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn delete(&self, session_id: &SessionId) {
        self.envelopes.remove(session_id);
        self.appends.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{IntentTag, UserId};
    use chrono::Utc;

    fn envelope(session: &str) -> ContextEnvelope {
        ContextEnvelope {
            session_id: SessionId::new(session),
            user_id: UserId::new("u1"),
            intent_tag: IntentTag::GeneralChat,
            payload: Default::default(),
            created_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn appends_evict_oldest_past_bound() {
        let store = WarmStore::new(3600, 2);
        let session = SessionId::new("s1");
        for i in 0..5 {
            store.push_append(
                &session,
                AppendedResult {
                    session_id: session.clone(),
                    append_id: format!("a{i}"),
                    source: crate::types::AppendSource::Engine,
                    output: serde_json::json!({ "i": i }),
                    created_at: Utc::now(),
                },
            );
        }
        let appends = store.get_appends(&session);
        assert_eq!(appends.len(), 2);
        assert_eq!(appends[0].append_id, "a3");
        assert_eq!(appends[1].append_id, "a4");
    }

    #[test]
    fn expired_envelope_returns_none() {
        let store = WarmStore::new(0, 100);
        store.set_envelope(envelope("s1"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get_envelope(&SessionId::new("s1")).is_none());
    }
}
