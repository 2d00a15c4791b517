use atrium_core::IntentTag;

use crate::adapter::ToolAdapter;
use crate::mock_adapters as mock;
use crate::weather::WeatherForecastAdapter;

/// 15s default, 30s for the Gmail-summarization family, per §5's deadline
/// table.
pub const DEFAULT_DEADLINE_SECS: u64 = 15;
pub const MAIL_SUMMARY_DEADLINE_SECS: u64 = 30;

pub struct ToolEntry {
    pub tag: IntentTag,
    pub adapter: Box<dyn ToolAdapter>,
    pub success_template: &'static str,
    pub error_template: &'static str,
    pub deadline_secs: u64,
}

/// The static registry of adapter + templates + deadline, keyed by tag.
/// Only direct-automation tags are present; approval-gated and llm_reply
/// tags never reach the dispatcher.
pub fn build_registry() -> Vec<ToolEntry> {
    vec![
        ToolEntry {
            tag: IntentTag::GetCurrentWeather,
            adapter: Box::new(mock::weather_now()),
            success_template: "It's currently {condition} and {temp_f}°F.",
            error_template: "I couldn't check the weather right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::GetWeatherForecast,
            adapter: Box::new(WeatherForecastAdapter),
            success_template: "Over the next {days} day(s) in {location}: {will_it_rain}, about a {chance_of_rain_percent}% chance of rain.",
            error_template: "I couldn't fetch the forecast right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::GetAirQualityIndex,
            adapter: Box::new(mock::air_quality()),
            success_template: "The air quality index is {aqi} ({category}).",
            error_template: "I couldn't check air quality right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::GetWeatherAlerts,
            adapter: Box::new(mock::weather_alerts()),
            success_template: "No active weather alerts.",
            error_template: "I couldn't check weather alerts right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::GetSunTimes,
            adapter: Box::new(mock::sun_times()),
            success_template: "Sunrise is at {sunrise}, sunset at {sunset}.",
            error_template: "I couldn't check sun times right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::WebSearch,
            adapter: Box::new(mock::web_search()),
            success_template: "Here's what I found.",
            error_template: "I couldn't search the web right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::CheckGmailInbox,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "You have {count} message(s) in your inbox.",
            error_template: "I couldn't check your inbox right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::CheckGmailUnread,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "You have {count} unread message(s).",
            error_template: "I couldn't check unread mail right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::EmailInboxCheck,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "Inbox check complete: {count} message(s).",
            error_template: "I couldn't complete the inbox check.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::SummarizeGmailEmails,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "Here's a summary of your recent emails.",
            error_template: "I couldn't summarize your inbox right now.",
            deadline_secs: MAIL_SUMMARY_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::SearchGmailEmails,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "Found {count} matching message(s).",
            error_template: "I couldn't search your email right now.",
            deadline_secs: MAIL_SUMMARY_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::CategorizeGmailEmails,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "Your inbox has been categorized.",
            error_template: "I couldn't categorize your inbox right now.",
            deadline_secs: MAIL_SUMMARY_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::GmailSmartActions,
            adapter: Box::new(mock::gmail_inbox()),
            success_template: "Suggested actions are ready.",
            error_template: "I couldn't generate smart actions right now.",
            deadline_secs: MAIL_SUMMARY_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::CheckLinkedinNotifications,
            adapter: Box::new(mock::linkedin_notifications()),
            success_template: "You have no new LinkedIn notifications.",
            error_template: "I couldn't check LinkedIn notifications right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::LinkedinJobAlerts,
            adapter: Box::new(mock::linkedin_notifications()),
            success_template: "No new job alerts.",
            error_template: "I couldn't check job alerts right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::ScrapePrice,
            adapter: Box::new(mock::price_scrape()),
            success_template: "I couldn't find a current price.",
            error_template: "I couldn't check that price right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::ScrapeProductListings,
            adapter: Box::new(mock::price_scrape()),
            success_template: "No matching listings found.",
            error_template: "I couldn't check listings right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::ScrapeNewsArticles,
            adapter: Box::new(mock::web_search()),
            success_template: "No matching articles found.",
            error_template: "I couldn't check the news right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::CheckWebsiteUpdates,
            adapter: Box::new(mock::web_search()),
            success_template: "No updates detected.",
            error_template: "I couldn't check for updates right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
        ToolEntry {
            tag: IntentTag::MonitorCompetitors,
            adapter: Box::new(mock::web_search()),
            success_template: "No competitor changes detected.",
            error_template: "I couldn't run competitor monitoring right now.",
            deadline_secs: DEFAULT_DEADLINE_SECS,
        },
    ]
}
