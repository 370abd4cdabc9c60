use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("stale object reference: {0}")]
    StaleObject(String),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("persistence error: {0}")]
    Persistence(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AiError>;
