use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8089;
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default per-tool-call deadlines, per spec §5.
pub const LLM_DEADLINE_SECS: u64 = 30;
pub const WARM_STORE_DEADLINE_SECS: u64 = 10;
pub const COLD_STORE_DEADLINE_SECS: u64 = 10;
pub const WEBHOOK_DEADLINE_SECS: u64 = 30;
pub const DIRECT_TOOL_DEADLINE_SECS: u64 = 15;
pub const MAIL_SUMMARY_DEADLINE_SECS: u64 = 30;

/// Top-level config (atrium.toml + ATRIUM_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtriumConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub features: FeatureFlags,
}

impl Default for AtriumConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            providers: ProvidersConfig::default(),
            context: ContextConfig::default(),
            memory: MemoryConfig::default(),
            approval: ApprovalConfig::default(),
            whatsapp: WhatsAppConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl AtriumConfig {
    /// Load config from a TOML file with `ATRIUM_*` env var overrides.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: AtriumConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ATRIUM_").split("_"))
            .extract()
            .map_err(|e| crate::error::AtriumError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.atrium/atrium.toml", home)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_db_path")]
    pub database_path: String,
    /// Shared bearer token required by the `/mcp/*` machine-to-machine
    /// endpoints (§4.4 "Authentication").
    pub mcp_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            database_path: default_db_path(),
            mcp_token: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.atrium/atrium.db", home)
}

/// The two logical LLM roles of §6: a fast-structured classifier provider
/// and a high-fluency dialogue provider. Both are OpenAI-wire-compatible
/// endpoints; the concrete vendor behind each is a deployment detail.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub fast_structured: Option<ProviderEndpointConfig>,
    pub high_fluency: Option<ProviderEndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpointConfig {
    pub api_key: String,
    pub base_url: String,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    pub model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_chat_path() -> String {
    "/v1/chat/completions".to_string()
}
fn default_max_retries() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Warm-tier TTL in seconds. Default 24h, per §4.4.
    #[serde(default = "default_warm_ttl")]
    pub warm_ttl_secs: i64,
    /// Bound on appends retained in the warm tier per session, per §4.4.
    #[serde(default = "default_max_warm_appends")]
    pub max_warm_appends: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            warm_ttl_secs: default_warm_ttl(),
            max_warm_appends: default_max_warm_appends(),
        }
    }
}

fn default_warm_ttl() -> i64 {
    24 * 60 * 60
}
fn default_max_warm_appends() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_path")]
    pub path: String,
    /// Gate on the (advertised-but-disabled-by-default) implicit fact
    /// extraction path, per §9 Open Questions.
    #[serde(default)]
    pub implicit_extraction_enabled: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
            implicit_extraction_enabled: false,
        }
    }
}

fn default_memory_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.atrium/semantic_memory.json", home)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Outbound webhook URL approved actions are POSTed to.
    pub webhook_url: Option<String>,
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: i64,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            pending_ttl_secs: default_pending_ttl(),
        }
    }
}

fn default_pending_ttl() -> i64 {
    30 * 60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub shared_token: Option<String>,
    /// Fixed identifier returned by `/api/mcp/validate` (e.g. a phone number).
    #[serde(default = "default_validate_identifier")]
    pub validate_identifier: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            shared_token: None,
            validate_identifier: default_validate_identifier(),
        }
    }
}

fn default_validate_identifier() -> String {
    "unconfigured".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "bool_true")]
    pub semantic_memory_enabled: bool,
    #[serde(default = "bool_true")]
    pub direct_automation_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            semantic_memory_enabled: true,
            direct_automation_enabled: true,
        }
    }
}

fn bool_true() -> bool {
    true
}
