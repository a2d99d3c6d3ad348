use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemexError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Unknown client: {0}")]
    UnknownClient(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, RemexError>;
