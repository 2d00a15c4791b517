use atrium_core::SessionId;
use dashmap::DashMap;

use crate::types::ContextEnvelope;

const HOT_TIER_CAP: usize = 256;

/// Optional small in-process cache of recently touched envelopes, per
/// §4.4's "Hot" tier. Purely best-effort: a miss here always falls through
/// to warm/cold, so there is no TTL or eviction-order guarantee beyond a
/// soft capacity bound.
pub struct HotStore {
    envelopes: DashMap<SessionId, ContextEnvelope>,
}

impl HotStore {
    pub fn new() -> Self {
        Self {
            envelopes: DashMap::new(),
        }
    }

    pub fn get(&self, session_id: &SessionId) -> Option<ContextEnvelope> {
        self.envelopes.get(session_id).map(|e| e.clone())
    }

    pub fn set(&self, envelope: ContextEnvelope) {
        if self.envelopes.len() >= HOT_TIER_CAP && !self.envelopes.contains_key(&envelope.session_id) {
            // Best-effort: drop an arbitrary entry rather than maintain a
            // real LRU order for a tier that is allowed to miss.
            if let Some(victim) = self.envelopes.iter().next().map(|e| e.key().clone()) {
                self.envelopes.remove(&victim);
            }
        }
        self.envelopes.insert(envelope.session_id.clone(), envelope);
    }

    pub fn delete(&self, session_id: &SessionId) {
        self.envelopes.remove(session_id);
    }
}

impl Default for HotStore {
    fn default() -> Self {
        Self::new()
    }
}
