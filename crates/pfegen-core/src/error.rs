use thiserror::Error;

#[derive(Error, Debug)]
pub enum PfeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Refusing to persist an unsuccessful report")]
    UnsuccessfulReport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PfeError>;
