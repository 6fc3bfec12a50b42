use thiserror::Error;

/// Crate-level error for setup and plumbing outside the request pipeline
#[derive(Error, Debug)]
pub enum BizError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Engine error: {0}")]
    Engine(#[from] crate::command::engine::EngineError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BizError>;
