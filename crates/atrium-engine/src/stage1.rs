//! Stage 1 of the classifier: a small table of keyword patterns checked
//! before paying for a remote classification call. A hit short-circuits
//! stage 2's remote classifier entirely and returns a high-confidence
//! decision built locally.

use atrium_core::IntentTag;

struct PatternRule {
    keywords: &'static [&'static str],
    tag: IntentTag,
}

/// Order matters: more specific phrasing is listed ahead of generic
/// catch-alls in the same family (e.g. "unread" before the bare inbox
/// check) so the first match wins.
const RULES: &[PatternRule] = &[
    PatternRule { keywords: &["unread email", "unread gmail", "unread messages"], tag: IntentTag::CheckGmailUnread },
    PatternRule { keywords: &["summarize my email", "summarize gmail", "summarize inbox"], tag: IntentTag::SummarizeGmailEmails },
    PatternRule { keywords: &["search my email", "search gmail", "find email"], tag: IntentTag::SearchGmailEmails },
    PatternRule { keywords: &["categorize my email", "categorize gmail", "sort my inbox"], tag: IntentTag::CategorizeGmailEmails },
    PatternRule { keywords: &["smart action", "gmail actions"], tag: IntentTag::GmailSmartActions },
    PatternRule { keywords: &["check my inbox", "check gmail", "check my email"], tag: IntentTag::CheckGmailInbox },
    PatternRule { keywords: &["inbox check"], tag: IntentTag::EmailInboxCheck },
    PatternRule { keywords: &["send an email", "send email", "email to", "compose an email"], tag: IntentTag::SendEmail },
    PatternRule { keywords: &["linkedin notification"], tag: IntentTag::CheckLinkedinNotifications },
    PatternRule { keywords: &["linkedin job", "job alert"], tag: IntentTag::LinkedinJobAlerts },
    PatternRule { keywords: &["price of", "check the price", "track price"], tag: IntentTag::ScrapePrice },
    PatternRule { keywords: &["product listing"], tag: IntentTag::ScrapeProductListings },
    PatternRule { keywords: &["news article", "latest news"], tag: IntentTag::ScrapeNewsArticles },
    PatternRule { keywords: &["website update", "check the website"], tag: IntentTag::CheckWebsiteUpdates },
    PatternRule { keywords: &["monitor competitor", "competitor analysis"], tag: IntentTag::MonitorCompetitors },
    PatternRule { keywords: &["weather forecast", "forecast for"], tag: IntentTag::GetWeatherForecast },
    PatternRule { keywords: &["air quality", "aqi"], tag: IntentTag::GetAirQualityIndex },
    PatternRule { keywords: &["weather alert", "storm warning"], tag: IntentTag::GetWeatherAlerts },
    PatternRule { keywords: &["sunrise", "sunset", "sun times"], tag: IntentTag::GetSunTimes },
    PatternRule { keywords: &["what's the weather", "current weather", "weather today", "weather like"], tag: IntentTag::GetCurrentWeather },
    PatternRule { keywords: &["search the web", "google ", "look up", "web search"], tag: IntentTag::WebSearch },
    PatternRule { keywords: &["create an event", "schedule a meeting", "add to calendar"], tag: IntentTag::CreateEvent },
    PatternRule { keywords: &["add a todo", "add to my todo", "todo item", "to-do list"], tag: IntentTag::AddTodo },
    PatternRule { keywords: &["remind me", "set a reminder"], tag: IntentTag::SetReminder },
    PatternRule { keywords: &["linkedin post", "post prompt", "generate a post"], tag: IntentTag::GeneratePostPromptPackage },
    PatternRule { keywords: &["write a poem", "write a story", "write me a", "creative writing"], tag: IntentTag::CreativeWriting },
    PatternRule { keywords: &["remember that", "forget that", "do you remember", "what do you know about me"], tag: IntentTag::MemoryOperation },
];

/// Returns the first matching tag, or `None` to fall through to the
/// remote classifier (stage 2).
pub fn classify(utterance: &str) -> Option<IntentTag> {
    let lower = utterance.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| rule.tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_weather_before_generic_chat() {
        assert_eq!(classify("what's the weather like in Austin"), Some(IntentTag::GetCurrentWeather));
    }

    #[test]
    fn matches_send_email() {
        assert_eq!(classify("send an email to my manager"), Some(IntentTag::SendEmail));
    }

    #[test]
    fn falls_through_on_no_match() {
        assert_eq!(classify("tell me a joke"), None);
    }

    #[test]
    fn unread_beats_generic_inbox_check() {
        assert_eq!(classify("any unread email in my gmail?"), Some(IntentTag::CheckGmailUnread));
    }
}
