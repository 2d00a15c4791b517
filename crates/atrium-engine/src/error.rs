use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
