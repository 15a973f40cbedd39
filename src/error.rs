//! Error types for the market query agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider returned status {0}")]
    ProviderStatus(u16),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AgentError {
    /// Message without the variant prefix, for text shown to the model.
    pub fn detail(&self) -> String {
        match self {
            AgentError::ProviderError(msg) | AgentError::LlmError(msg) => msg.clone(),
            AgentError::ProviderStatus(code) => format!("status {}", code),
            other => other.to_string(),
        }
    }
}
