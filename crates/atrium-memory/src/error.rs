use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("I/O error persisting semantic_memory.json: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("fact not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
