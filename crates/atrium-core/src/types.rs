use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, client-supplied session identifier. Unlike a durable account id,
/// a `SessionId` carries no structure this system understands beyond the
/// channel namespace prefix the WhatsApp bridge applies
/// (`"whatsapp_" + session_id`) — sessions are not durable user accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix this id for the WhatsApp channel namespace, per §4.6.
    pub fn whatsapp_namespaced(raw: &str) -> Self {
        Self(format!("whatsapp_{raw}"))
    }

    /// Auto-assigned id for bridge requests with no `session_id`, per §4.6.
    pub fn auto_assigned(epoch_secs: i64) -> Self {
        Self(format!("test_session_{epoch_secs}"))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque user identifier supplied by the calling channel. This system does
/// not own durable user accounts — a `UserId` is just a label carried
/// through turns, context and memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Channel an utterance arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Http,
    Whatsapp,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Http => write!(f, "http"),
            Channel::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

/// The closed intent-tag catalogue. Unknown/unparsed tags never enter the
/// system — a failed classification maps to `GeneralChat` at the call site,
/// never to some out-of-band "unknown" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    GeneralChat,
    SendEmail,
    CreateEvent,
    AddTodo,
    SetReminder,
    GeneratePostPromptPackage,
    WebSearch,
    CheckGmailInbox,
    CheckGmailUnread,
    EmailInboxCheck,
    SummarizeGmailEmails,
    SearchGmailEmails,
    CategorizeGmailEmails,
    GmailSmartActions,
    CheckLinkedinNotifications,
    LinkedinJobAlerts,
    ScrapePrice,
    ScrapeProductListings,
    ScrapeNewsArticles,
    CheckWebsiteUpdates,
    MonitorCompetitors,
    GetCurrentWeather,
    GetWeatherForecast,
    GetAirQualityIndex,
    GetWeatherAlerts,
    GetSunTimes,
    CreativeWriting,
    MemoryOperation,
}

impl IntentTag {
    /// All 27 tags of the closed catalogue, in glossary order.
    pub const ALL: &'static [IntentTag] = &[
        IntentTag::GeneralChat,
        IntentTag::SendEmail,
        IntentTag::CreateEvent,
        IntentTag::AddTodo,
        IntentTag::SetReminder,
        IntentTag::GeneratePostPromptPackage,
        IntentTag::WebSearch,
        IntentTag::CheckGmailInbox,
        IntentTag::CheckGmailUnread,
        IntentTag::EmailInboxCheck,
        IntentTag::SummarizeGmailEmails,
        IntentTag::SearchGmailEmails,
        IntentTag::CategorizeGmailEmails,
        IntentTag::GmailSmartActions,
        IntentTag::CheckLinkedinNotifications,
        IntentTag::LinkedinJobAlerts,
        IntentTag::ScrapePrice,
        IntentTag::ScrapeProductListings,
        IntentTag::ScrapeNewsArticles,
        IntentTag::CheckWebsiteUpdates,
        IntentTag::MonitorCompetitors,
        IntentTag::GetCurrentWeather,
        IntentTag::GetWeatherForecast,
        IntentTag::GetAirQualityIndex,
        IntentTag::GetWeatherAlerts,
        IntentTag::GetSunTimes,
        IntentTag::CreativeWriting,
        IntentTag::MemoryOperation,
    ];

    /// The direct-automation set from the Glossary: tags whose execution
    /// runs a bounded tool and renders the result without approval.
    pub fn is_direct_automation(self) -> bool {
        matches!(
            self,
            IntentTag::CheckGmailInbox
                | IntentTag::CheckGmailUnread
                | IntentTag::EmailInboxCheck
                | IntentTag::SummarizeGmailEmails
                | IntentTag::SearchGmailEmails
                | IntentTag::CategorizeGmailEmails
                | IntentTag::GmailSmartActions
                | IntentTag::GetCurrentWeather
                | IntentTag::GetWeatherForecast
                | IntentTag::GetAirQualityIndex
                | IntentTag::GetWeatherAlerts
                | IntentTag::GetSunTimes
                | IntentTag::WebSearch
                | IntentTag::CheckLinkedinNotifications
                | IntentTag::LinkedinJobAlerts
                | IntentTag::ScrapePrice
                | IntentTag::ScrapeProductListings
                | IntentTag::ScrapeNewsArticles
                | IntentTag::CheckWebsiteUpdates
                | IntentTag::MonitorCompetitors
        )
    }

    /// The approval-gated set from the Glossary.
    pub fn is_approval_gated(self) -> bool {
        matches!(
            self,
            IntentTag::SendEmail | IntentTag::GeneratePostPromptPackage
        )
    }

    /// Mail-family tags that require delegated credentials before dispatch.
    pub fn requires_mail_auth(self) -> bool {
        matches!(
            self,
            IntentTag::CheckGmailInbox
                | IntentTag::CheckGmailUnread
                | IntentTag::EmailInboxCheck
                | IntentTag::SummarizeGmailEmails
                | IntentTag::SearchGmailEmails
                | IntentTag::CategorizeGmailEmails
                | IntentTag::GmailSmartActions
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentTag::GeneralChat => "general_chat",
            IntentTag::SendEmail => "send_email",
            IntentTag::CreateEvent => "create_event",
            IntentTag::AddTodo => "add_todo",
            IntentTag::SetReminder => "set_reminder",
            IntentTag::GeneratePostPromptPackage => "generate_post_prompt_package",
            IntentTag::WebSearch => "web_search",
            IntentTag::CheckGmailInbox => "check_gmail_inbox",
            IntentTag::CheckGmailUnread => "check_gmail_unread",
            IntentTag::EmailInboxCheck => "email_inbox_check",
            IntentTag::SummarizeGmailEmails => "summarize_gmail_emails",
            IntentTag::SearchGmailEmails => "search_gmail_emails",
            IntentTag::CategorizeGmailEmails => "categorize_gmail_emails",
            IntentTag::GmailSmartActions => "gmail_smart_actions",
            IntentTag::CheckLinkedinNotifications => "check_linkedin_notifications",
            IntentTag::LinkedinJobAlerts => "linkedin_job_alerts",
            IntentTag::ScrapePrice => "scrape_price",
            IntentTag::ScrapeProductListings => "scrape_product_listings",
            IntentTag::ScrapeNewsArticles => "scrape_news_articles",
            IntentTag::CheckWebsiteUpdates => "check_website_updates",
            IntentTag::MonitorCompetitors => "monitor_competitors",
            IntentTag::GetCurrentWeather => "get_current_weather",
            IntentTag::GetWeatherForecast => "get_weather_forecast",
            IntentTag::GetAirQualityIndex => "get_air_quality_index",
            IntentTag::GetWeatherAlerts => "get_weather_alerts",
            IntentTag::GetSunTimes => "get_sun_times",
            IntentTag::CreativeWriting => "creative_writing",
            IntentTag::MemoryOperation => "memory_operation",
        }
    }

    pub fn from_str_tag(s: &str) -> Option<IntentTag> {
        IntentTag::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for IntentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which downstream execution lane handles a classified turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingLane {
    DirectAuto,
    LlmReply,
    ApprovalGated,
}

impl fmt::Display for RoutingLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingLane::DirectAuto => write!(f, "direct_auto"),
            RoutingLane::LlmReply => write!(f, "llm_reply"),
            RoutingLane::ApprovalGated => write!(f, "approval_gated"),
        }
    }
}

/// The nine stage-2 classification dimensions, each with a tag-family
/// default used when the dimension classifier fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalComplexity {
    #[default]
    Low,
    Med,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreativeRequirement {
    #[default]
    None,
    Low,
    Med,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalComplexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    #[default]
    Short,
    Med,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Informational,
    #[default]
    Conversational,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextDependency {
    #[default]
    None,
    Session,
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningType {
    Logical,
    Emotional,
    #[default]
    Creative,
    Analytical,
}

/// The nine-dimension assessment from stage 2 of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub emotional_complexity: EmotionalComplexity,
    pub professional_tone_required: bool,
    pub creative_requirement: CreativeRequirement,
    pub technical_complexity: TechnicalComplexity,
    pub response_length: ResponseLength,
    pub engagement_level: EngagementLevel,
    pub context_dependency: ContextDependency,
    pub reasoning_type: ReasoningType,
}

/// `{intent_tag, parameters, confidence, routing_lane, explanation}` — one
/// per turn. Per REDESIGN FLAGS §9, `parameters` stays a dynamic map
/// (different tag families need different slots) but the tag itself is
/// never stringly typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDecision {
    pub intent_tag: IntentTag,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    pub confidence: f32,
    pub routing_lane: RoutingLane,
    pub explanation: String,
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl IntentDecision {
    /// The default decision substituted when all LLM providers fail, per
    /// §4.1's `ClassifierUnavailable` recovery rule.
    pub fn classifier_unavailable_default() -> Self {
        Self {
            intent_tag: IntentTag::GeneralChat,
            parameters: BTreeMap::new(),
            confidence: 0.5,
            routing_lane: RoutingLane::LlmReply,
            explanation: "classifier unavailable, defaulted to general_chat".to_string(),
            dimensions: Dimensions::default(),
        }
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }
}

/// One inbound utterance plus its produced reply. Immutable once written;
/// ordered by `created_at` within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub channel: Channel,
    pub user_text: String,
    pub ai_text: String,
    pub intent: IntentTag,
    pub routing: RoutingLane,
    pub needs_approval: bool,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new_id() -> String {
        Uuid::now_v7().to_string()
    }
}
