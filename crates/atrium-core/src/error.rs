use thiserror::Error;

/// Error taxonomy shared across the gateway. Leaf crates define their own
/// narrower `thiserror` enums (`ContextError`, `MemoryError`, `EngineError`,
/// `DispatchError`, `ApprovalError`, `WhatsAppError`); `atrium-gateway` is
/// the only place these get mapped to an HTTP status. `AtriumError` is the
/// common shape every leaf error can be converted into when a handler needs
/// a single type to respond with.
#[derive(Debug, Error)]
pub enum AtriumError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("store error (transient): {0}")]
    StoreTransient(String),

    #[error("store error (fatal): {0}")]
    StoreFatal(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AtriumError {
    /// Short, stable error code sent to clients in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AtriumError::Config(_) => "CONFIG_ERROR",
            AtriumError::AuthRequired => "AUTH_REQUIRED",
            AtriumError::Unauthenticated(_) => "UNAUTHENTICATED",
            AtriumError::InvalidRequest(_) => "INVALID_REQUEST",
            AtriumError::NotFound(_) => "NOT_FOUND",
            AtriumError::ClassifierUnavailable(_) => "CLASSIFIER_UNAVAILABLE",
            AtriumError::ToolUnavailable(_) => "TOOL_UNAVAILABLE",
            AtriumError::StoreTransient(_) => "STORE_TRANSIENT",
            AtriumError::StoreFatal(_) => "STORE_FATAL",
            AtriumError::Serialization(_) => "SERIALIZATION_ERROR",
            AtriumError::Io(_) => "IO_ERROR",
            AtriumError::Timeout { .. } => "TIMEOUT",
            AtriumError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code this error should be reported as.
    pub fn status(&self) -> u16 {
        match self {
            AtriumError::AuthRequired | AtriumError::Unauthenticated(_) => 401,
            AtriumError::InvalidRequest(_) => 400,
            AtriumError::NotFound(_) => 404,
            AtriumError::Timeout { .. } => 504,
            AtriumError::ClassifierUnavailable(_)
            | AtriumError::ToolUnavailable(_)
            | AtriumError::StoreTransient(_) => 503,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, AtriumError>;
