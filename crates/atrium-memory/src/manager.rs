use std::collections::HashSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MemoryError, Result};
use crate::types::{
    FactCategory, FactMetadata, MemoryDecision, MemoryDocument, SemanticFact, CONFIDENCE_RULE_BASED,
};

/// Maximum rendered context size in characters, mirrors the prompt-budget
/// ceiling used elsewhere in the gateway.
const MAX_CONTEXT_CHARS: usize = 6000;

/// Two phrases in the same category are considered the same fact once
/// their token overlap reaches this ratio, per §3 "facts are unique per
/// category".
const DEDUP_OVERLAP_THRESHOLD: f32 = 0.7;

/// Holds the semantic-memory document in memory and rewrites it to disk
/// atomically (write-to-tempfile, then rename) on every mutation, per
/// §4.5 "Persistence". There is exactly one writer process; the `RwLock`
/// only serialises in-process access.
pub struct MemoryManager {
    path: PathBuf,
    doc: RwLock<MemoryDocument>,
}

impl MemoryManager {
    /// Loads the document from `path` if it exists, otherwise starts
    /// empty — the file is created on first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryDocument::default(),
            Err(e) => return Err(MemoryError::Io(e)),
        };
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    fn persist(&self) -> Result<()> {
        let doc = self.doc.read().unwrap();
        let bytes = serde_json::to_vec_pretty(&*doc)?;
        drop(doc);
        atomic_write(&self.path, &bytes)?;
        Ok(())
    }

    /// Rule-based decision of what, if anything, to do with an utterance.
    /// A real deployment plugs an LLM-based extractor ahead of this as the
    /// primary path (§4.5 "confidence 0.8 when LLM-extracted"); this is the
    /// fallback that always runs and is the only path in this gateway,
    /// since implicit extraction is off by default (§9 Open Question).
    pub fn classify(utterance: &str) -> MemoryDecision {
        let lower = utterance.to_lowercase();
        if lower.contains("forget") || lower.contains("stop remembering") {
            MemoryDecision::Forget
        } else if lower.contains("do you remember")
            || lower.contains("what do you know about me")
            || lower.starts_with("recall")
        {
            MemoryDecision::Recall
        } else if extract_candidate(&lower).is_some() {
            MemoryDecision::Store
        } else {
            MemoryDecision::None
        }
    }

    /// Runs the full store pipeline for an utterance classified as `Store`:
    /// extract a candidate fact, merge it against existing facts in the
    /// same category, persist.
    pub fn process_store(&self, utterance: &str, session_id: &str) -> Result<Option<SemanticFact>> {
        let lower = utterance.to_lowercase();
        let Some((category, content)) = extract_candidate(&lower) else {
            return Ok(None);
        };
        let fact = self.learn(
            session_id,
            category,
            &content,
            CONFIDENCE_RULE_BASED,
            utterance,
        )?;
        Ok(Some(fact))
    }

    /// Runs the forget pipeline: removes the closest-matching fact to the
    /// utterance, scoped to no particular category (any fact can be
    /// forgotten).
    pub fn process_forget(&self, utterance: &str) -> Result<Option<SemanticFact>> {
        let query = strip_forget_prefix(&utterance.to_lowercase());
        let mut doc = self.doc.write().unwrap();
        let idx = doc
            .facts
            .iter()
            .enumerate()
            .map(|(i, f)| (i, token_overlap(&f.content, &query)))
            .filter(|(_, score)| *score >= DEDUP_OVERLAP_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        let removed = idx.map(|(i, _)| doc.facts.remove(i));
        drop(doc);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Stores or merges a fact, applying the per-category merge policy from
    /// §4.5:
    /// - `preferences` overwrite-newest (the latest statement wins outright)
    /// - `identity` prefers the more specific (longer) text
    /// - everything else concatenates distinct statements with "; "
    pub fn learn(
        &self,
        session_id: &str,
        category: FactCategory,
        content: &str,
        confidence: f32,
        source_utterance: &str,
    ) -> Result<SemanticFact> {
        let now = Utc::now();
        let mut doc = self.doc.write().unwrap();

        let existing_idx = doc
            .facts
            .iter()
            .position(|f| f.category == category && token_overlap(&f.content, content) >= DEDUP_OVERLAP_THRESHOLD);

        let fact = if let Some(idx) = existing_idx {
            let existing = &mut doc.facts[idx];
            match category {
                FactCategory::Preferences => {
                    existing.content = content.to_string();
                }
                FactCategory::Identity => {
                    if content.len() > existing.content.len() {
                        existing.content = content.to_string();
                    }
                }
                _ => {
                    if !existing.content.contains(content) {
                        existing.content = format!("{}; {}", existing.content, content);
                    }
                }
            }
            existing.confidence = existing.confidence.max(confidence);
            existing.updated_at = now;
            existing.metadata.source_messages.push(source_utterance.to_string());
            existing.clone()
        } else {
            let fact = SemanticFact {
                id: Uuid::new_v4().to_string(),
                content: content.to_string(),
                category,
                confidence,
                source_utterance: source_utterance.to_string(),
                session_id: session_id.to_string(),
                created_at: now,
                updated_at: now,
                metadata: FactMetadata {
                    source_messages: vec![source_utterance.to_string()],
                    extra: Default::default(),
                },
            };
            doc.facts.push(fact.clone());
            fact
        };

        drop(doc);
        self.persist()?;
        debug!(category = %fact.category, "learned fact");
        Ok(fact)
    }

    /// Facts whose content overlaps the query beyond the dedup threshold,
    /// most-confident first. Backs the `recall` decision and `GET
    /// /memory/context/{session_id}`.
    pub fn recall(&self, query: &str, limit: usize) -> Vec<SemanticFact> {
        let doc = self.doc.read().unwrap();
        let mut scored: Vec<_> = doc
            .facts
            .iter()
            .map(|f| (token_overlap(&f.content, query), f.clone()))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        scored.into_iter().take(limit).map(|(_, f)| f).collect()
    }

    /// Runs the recall pipeline for an utterance classified as `Recall`:
    /// strips the trigger phrase and scores the remainder against stored
    /// facts. A generic trigger like "what do you know about me?" strips
    /// down to nothing worth scoring, so when the stripped query comes back
    /// empty (or scores nothing) this falls back to the most-confident
    /// facts overall rather than returning nothing.
    pub fn process_recall(&self, utterance: &str, limit: usize) -> Vec<SemanticFact> {
        let query = strip_recall_prefix(&utterance.to_lowercase());
        if !query.is_empty() {
            let scored = self.recall(&query, limit);
            if !scored.is_empty() {
                return scored;
            }
        }
        let doc = self.doc.read().unwrap();
        let mut facts = doc.facts.clone();
        facts.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
        facts.into_iter().take(limit).collect()
    }

    pub fn stats(&self) -> MemoryStats {
        let doc = self.doc.read().unwrap();
        let mut by_category = std::collections::BTreeMap::new();
        for fact in &doc.facts {
            *by_category.entry(fact.category.as_str().to_string()).or_insert(0usize) += 1;
        }
        MemoryStats {
            total_facts: doc.facts.len(),
            by_category,
        }
    }

    /// Renders every fact into a prompt-ready Markdown block, grouped and
    /// ordered by `FactCategory::PRIORITY_ORDER`, truncated to
    /// `MAX_CONTEXT_CHARS`.
    pub fn context_for_ai(&self) -> String {
        let doc = self.doc.read().unwrap();
        let mut out = String::with_capacity(MAX_CONTEXT_CHARS);

        for category in FactCategory::PRIORITY_ORDER {
            let facts: Vec<_> = doc.facts.iter().filter(|f| f.category == *category).collect();
            if facts.is_empty() {
                continue;
            }
            let header = format!("## {}\n", capitalize(category.as_str()));
            if out.len() + header.len() > MAX_CONTEXT_CHARS {
                break;
            }
            out.push_str(&header);
            for fact in facts {
                let line = format!("- {}\n", fact.content);
                if out.len() + line.len() > MAX_CONTEXT_CHARS {
                    warn!("context_for_ai truncated at category boundary");
                    return out;
                }
                out.push_str(&line);
            }
        }
        out
    }
}

pub struct MemoryStats {
    pub total_facts: usize,
    pub by_category: std::collections::BTreeMap<String, usize>,
}

/// Very small rule-based extractor: looks for a handful of first-person
/// patterns and assigns a category by keyword. This is the `confidence
/// 0.6` fallback path; an LLM-backed extractor would replace this
/// function's output with `CONFIDENCE_LLM_EXTRACTED` results while keeping
/// the same `(FactCategory, String)` contract.
fn extract_candidate(lower: &str) -> Option<(FactCategory, String)> {
    let patterns: &[(&str, FactCategory)] = &[
        ("i like ", FactCategory::Preferences),
        ("i prefer ", FactCategory::Preferences),
        ("i love ", FactCategory::Preferences),
        ("i hate ", FactCategory::Preferences),
        ("i am ", FactCategory::Identity),
        ("i'm ", FactCategory::Identity),
        ("my name is ", FactCategory::Identity),
        ("i work as ", FactCategory::Identity),
        ("i know how to ", FactCategory::Skills),
        ("i can ", FactCategory::Skills),
        ("my goal is ", FactCategory::Goals),
        ("i want to ", FactCategory::Goals),
        ("my wife", FactCategory::Relationships),
        ("my husband", FactCategory::Relationships),
        ("my friend", FactCategory::Relationships),
        ("please respond", FactCategory::Style),
        ("keep it ", FactCategory::Style),
    ];

    for (needle, category) in patterns {
        if let Some(pos) = lower.find(needle) {
            let content = lower[pos..].trim().trim_end_matches('.').to_string();
            if !content.is_empty() {
                return Some((*category, content));
            }
        }
    }
    None
}

fn strip_forget_prefix(lower: &str) -> String {
    for prefix in ["forget that ", "forget ", "stop remembering that ", "stop remembering "] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    lower.to_string()
}

/// Strips the handful of recall trigger phrases `classify` matches on,
/// leaving whatever specific topic (if any) followed them. Generic
/// phrasing like "what do you know about me?" strips down to an empty
/// string, which `process_recall` treats as "no topic, return everything".
fn strip_recall_prefix(lower: &str) -> String {
    let trimmed = lower.trim().trim_end_matches('?');
    for prefix in [
        "do you remember ",
        "do you remember",
        "what do you know about me",
        "recall ",
        "recall",
    ] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

fn token_overlap(a: &str, b: &str) -> f32 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let smaller = ta.len().min(tb.len());
    intersection as f32 / smaller as f32
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager() -> (MemoryManager, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("semantic_memory.json");
        (MemoryManager::open(&path).unwrap(), dir)
    }

    #[test]
    fn learn_then_recall_round_trips() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Preferences, "i like dark roast coffee", 0.6, "i like dark roast coffee")
            .unwrap();
        let found = mgr.recall("dark roast coffee", 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, FactCategory::Preferences);
    }

    #[test]
    fn preferences_overwrite_newest() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Preferences, "i like tea", 0.6, "i like tea").unwrap();
        mgr.learn("s1", FactCategory::Preferences, "i like tea with milk", 0.6, "i like tea with milk")
            .unwrap();
        let stats = mgr.stats();
        assert_eq!(stats.total_facts, 1);
    }

    #[test]
    fn facts_concatenate_distinct_statements() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Facts, "i own a car", 0.6, "i own a car").unwrap();
        mgr.learn("s1", FactCategory::Facts, "i own a car and a bike", 0.6, "i own a car and a bike")
            .unwrap();
        let found = mgr.recall("car", 5);
        assert_eq!(found.len(), 1);
        assert!(found[0].content.contains("bike"));
    }

    #[test]
    fn forget_removes_matching_fact() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Preferences, "i like jazz music", 0.6, "i like jazz music")
            .unwrap();
        let removed = mgr.process_forget("forget that i like jazz music").unwrap();
        assert!(removed.is_some());
        assert_eq!(mgr.stats().total_facts, 0);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("semantic_memory.json");
        {
            let mgr = MemoryManager::open(&path).unwrap();
            mgr.learn("s1", FactCategory::Skills, "i can play guitar", 0.6, "i can play guitar")
                .unwrap();
        }
        let reopened = MemoryManager::open(&path).unwrap();
        assert_eq!(reopened.stats().total_facts, 1);
    }

    #[test]
    fn generic_recall_query_falls_back_to_all_facts() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Identity, "my name is avery", 0.6, "my name is avery")
            .unwrap();
        mgr.learn("s1", FactCategory::Preferences, "i like dark roast coffee", 0.6, "i like dark roast coffee")
            .unwrap();
        let found = mgr.process_recall("what do you know about me?", 5);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn topical_recall_query_still_scores_by_overlap() {
        let (mgr, _dir) = manager();
        mgr.learn("s1", FactCategory::Identity, "my name is avery", 0.6, "my name is avery")
            .unwrap();
        mgr.learn("s1", FactCategory::Preferences, "i like dark roast coffee", 0.6, "i like dark roast coffee")
            .unwrap();
        let found = mgr.process_recall("do you remember my coffee preference?", 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, FactCategory::Preferences);
    }

    #[test]
    fn classify_detects_store_forget_recall_none() {
        assert_eq!(MemoryManager::classify("i like pizza"), MemoryDecision::Store);
        assert_eq!(MemoryManager::classify("forget that i like pizza"), MemoryDecision::Forget);
        assert_eq!(MemoryManager::classify("do you remember my name?"), MemoryDecision::Recall);
        assert_eq!(MemoryManager::classify("what's the weather today"), MemoryDecision::None);
    }
}
