//! Isolated extraction of a `Subject:` / `Body:` pair out of a second-model
//! reply, per REDESIGN FLAGS §9. Kept as its own module — nothing else in
//! the engine reaches into a raw LLM reply string.

use regex::Regex;
use std::sync::OnceLock;

fn subject_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*subject\s*:\s*(.+)$").unwrap())
}

fn body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ims)^\s*body\s*:\s*(.+)").unwrap())
}

fn recipient_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*(?:recipient|to)\s*:\s*(.+)$").unwrap())
}

fn post_description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*post description\s*:\s*(.+)$").unwrap())
}

fn ai_instructions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*ai instructions\s*:\s*(.+)$").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedContent {
    pub recipient_name: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub post_description: Option<String>,
    pub ai_instructions: Option<String>,
}

/// Pulls `Recipient:`/`Subject:`/`Body:`/`Post description:`/`AI
/// instructions:` lines out of a reply. If no `Subject:` line is present
/// the whole reply becomes the body, since not every approval-gated tag
/// (e.g. `generate_post_prompt_package`) has a subject line.
pub fn extract(reply: &str) -> ExtractedContent {
    let recipient_name = recipient_re()
        .captures(reply)
        .map(|c| c[1].trim().to_string());

    let subject = subject_re()
        .captures(reply)
        .map(|c| c[1].trim().to_string());

    let body = body_re()
        .captures(reply)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| reply.trim().to_string());

    let post_description = post_description_re()
        .captures(reply)
        .map(|c| c[1].trim().to_string());

    let ai_instructions = ai_instructions_re()
        .captures(reply)
        .map(|c| c[1].trim().to_string());

    ExtractedContent {
        recipient_name,
        subject,
        body,
        post_description,
        ai_instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_subject_and_body() {
        let reply = "Subject: Following up on our meeting\nBody: Hi Jane,\n\nGreat chatting today.\n";
        let extracted = extract(reply);
        assert_eq!(extracted.subject.as_deref(), Some("Following up on our meeting"));
        assert!(extracted.body.starts_with("Hi Jane,"));
    }

    #[test]
    fn falls_back_to_whole_reply_without_subject_line() {
        let reply = "Just a plain draft with no headers at all.";
        let extracted = extract(reply);
        assert!(extracted.subject.is_none());
        assert_eq!(extracted.body, reply);
    }

    #[test]
    fn extracts_recipient_and_subject() {
        let reply = "To: Sarah\nSubject: Quarterly report\nBody: Hi Sarah, attached is the quarterly report.\n";
        let extracted = extract(reply);
        assert_eq!(extracted.recipient_name.as_deref(), Some("Sarah"));
        assert_eq!(extracted.subject.as_deref(), Some("Quarterly report"));
    }

    #[test]
    fn extracts_post_description_and_ai_instructions() {
        let reply = "Post description: A launch announcement\nAI instructions: Keep it upbeat and under 100 words.";
        let extracted = extract(reply);
        assert_eq!(extracted.post_description.as_deref(), Some("A launch announcement"));
        assert_eq!(extracted.ai_instructions.as_deref(), Some("Keep it upbeat and under 100 words."));
    }
}
