use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("no pending action with id {0}")]
    NotFound(String),

    #[error("webhook dispatch failed: {0}")]
    WebhookFailed(String),

    #[error("no webhook url configured")]
    NoWebhookConfigured,
}

pub type Result<T> = std::result::Result<T, ApprovalError>;
