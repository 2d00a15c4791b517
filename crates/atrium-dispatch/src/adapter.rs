use async_trait::async_trait;
use serde_json::Value;

use crate::error::DispatchError;
use crate::types::DispatchRequest;

/// One concrete tool behind a direct-automation intent tag. Adapters return
/// a raw JSON payload; the dispatcher renders it into `reply_text` using
/// the tag's configured templates, per §4.2.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    async fn call(&self, req: &DispatchRequest) -> Result<Value, DispatchError>;
}

/// Looks up delegated credentials for the mail family. §4.2's auth-required
/// short-circuit consults this before ever invoking a mail adapter.
pub trait CredentialStore: Send + Sync {
    fn has_mail_credentials(&self, user_id: &str) -> bool;
}

/// A `CredentialStore` that reports no one has connected credentials —
/// the conservative default when no identity provider is wired in.
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn has_mail_credentials(&self, _user_id: &str) -> bool {
        false
    }
}
