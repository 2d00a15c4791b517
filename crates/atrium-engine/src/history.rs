//! Per-session rolling classification history. Advisory only — per §5
//! "shared resource policy", nothing downstream treats this as
//! authoritative; it exists purely to give the stage-2 classifier and
//! second-model rendering pass a little short-term memory of what lane
//! recent turns took.

use std::collections::VecDeque;

use atrium_core::{IntentDecision, SessionId};
use dashmap::DashMap;

const MAX_HISTORY: usize = 10;

#[derive(Default)]
pub struct ClassificationHistory {
    per_session: DashMap<SessionId, VecDeque<IntentDecision>>,
}

impl ClassificationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, session_id: &SessionId, decision: IntentDecision) {
        let mut entry = self.per_session.entry(session_id.clone()).or_default();
        if entry.len() >= MAX_HISTORY {
            entry.pop_front();
        }
        entry.push_back(decision);
    }

    pub fn recent(&self, session_id: &SessionId) -> Vec<IntentDecision> {
        self.per_session
            .get(session_id)
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_ten_entries() {
        let history = ClassificationHistory::new();
        let session = SessionId::new("s1");
        for _ in 0..15 {
            history.record(&session, IntentDecision::classifier_unavailable_default());
        }
        assert_eq!(history.recent(&session).len(), 10);
    }
}
