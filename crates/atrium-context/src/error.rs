use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context store error (transient): {0}")]
    Transient(String),

    #[error("context store error (fatal): {0}")]
    Fatal(String),

    #[error("session not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;

impl From<rusqlite::Error> for ContextError {
    fn from(e: rusqlite::Error) -> Self {
        // rusqlite doesn't distinguish connection-level outages from
        // constraint/logic errors at the type level; treat everything as
        // fatal (cold tier unreachable) per spec §7's StoreFatal mapping —
        // callers that can tolerate best-effort writes downgrade this
        // themselves (see ContextStore::write_context).
        ContextError::Fatal(e.to_string())
    }
}
