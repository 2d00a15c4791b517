use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a [`SemanticFact`]. Priority order for `ContextForAI`
/// rendering: identity > preferences > relationships > facts > skills >
/// goals > style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
    Identity,
    Preferences,
    Relationships,
    Facts,
    Skills,
    Goals,
    Style,
}

impl FactCategory {
    pub const PRIORITY_ORDER: &'static [FactCategory] = &[
        FactCategory::Identity,
        FactCategory::Preferences,
        FactCategory::Relationships,
        FactCategory::Facts,
        FactCategory::Skills,
        FactCategory::Goals,
        FactCategory::Style,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactCategory::Identity => "identity",
            FactCategory::Preferences => "preferences",
            FactCategory::Relationships => "relationships",
            FactCategory::Facts => "facts",
            FactCategory::Skills => "skills",
            FactCategory::Goals => "goals",
            FactCategory::Style => "style",
        }
    }
}

impl std::fmt::Display for FactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A long-lived personal fact about a user. Unique per (category,
/// content-fingerprint); merges rather than duplicates, per §3 invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticFact {
    pub id: String,
    /// Normalised lowercase phrase.
    pub content: String,
    pub category: FactCategory,
    pub confidence: f32,
    pub source_utterance: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: FactMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FactMetadata {
    /// Every source utterance that contributed to this fact across merges.
    #[serde(default)]
    pub source_messages: Vec<String>,
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Confidence assigned to facts depending on how they were extracted, per
/// §4.5 "Fact lifecycle".
pub const CONFIDENCE_LLM_EXTRACTED: f32 = 0.8;
pub const CONFIDENCE_RULE_BASED: f32 = 0.6;

/// The on-disk document: a single JSON document holding every fact,
/// rewritten atomically on every mutation per §4.5 "Persistence".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemoryDocument {
    pub facts: Vec<SemanticFact>,
}

/// Decision returned by `Process`, per §4.5's operation contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryDecision {
    Store,
    Forget,
    Recall,
    None,
}
