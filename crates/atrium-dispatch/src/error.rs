use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("auth required: {0}")]
    AuthRequired(String),

    #[error("dispatch timed out after {0}s")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
