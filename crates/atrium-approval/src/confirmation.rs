//! The confirmation predicate, per §4.3 / §9's "conservative confirmation
//! predicate" design note: a short reply is treated as a yes/no answer to
//! a pending action only if it is short, contains no email-like tokens
//! (so a reply that's actually a new email address or quoted address
//! never gets misread as a confirmation), and contains a recognised
//! confirmation lexeme.

const MAX_WORDS: usize = 5;

const CONFIRM_LEXEMES: &[&str] = &[
    "yes", "yep", "yeah", "confirm", "confirmed", "approve", "approved", "send it", "go ahead",
    "do it", "ok", "okay", "sure",
];

const REJECT_LEXEMES: &[&str] = &["no", "nope", "cancel", "don't", "stop", "reject"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationVerdict {
    Confirmed,
    Rejected,
    NotAConfirmation,
}

fn looks_email_like(text: &str) -> bool {
    text.contains('@') || text.contains("http://") || text.contains("https://")
}

pub fn classify(reply: &str) -> ConfirmationVerdict {
    let trimmed = reply.trim();
    let lower = trimmed.to_lowercase();

    if trimmed.split_whitespace().count() > MAX_WORDS || looks_email_like(&lower) {
        return ConfirmationVerdict::NotAConfirmation;
    }

    if REJECT_LEXEMES.iter().any(|l| lower.contains(l)) {
        return ConfirmationVerdict::Rejected;
    }
    if CONFIRM_LEXEMES.iter().any(|l| lower.contains(l)) {
        return ConfirmationVerdict::Confirmed;
    }
    ConfirmationVerdict::NotAConfirmation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_yes_confirms() {
        assert_eq!(classify("yes send it"), ConfirmationVerdict::Confirmed);
    }

    #[test]
    fn long_reply_is_not_a_confirmation() {
        assert_eq!(
            classify("yes please go ahead and send that email to everyone on the list"),
            ConfirmationVerdict::NotAConfirmation
        );
    }

    #[test]
    fn email_like_reply_is_never_a_confirmation() {
        assert_eq!(classify("ok jane@example.com"), ConfirmationVerdict::NotAConfirmation);
    }

    #[test]
    fn no_rejects() {
        assert_eq!(classify("no, cancel that"), ConfirmationVerdict::Rejected);
    }
}
