//! Error types for Lingocast
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation at the binary edge.

use thiserror::Error;

/// Main error type for Lingocast operations
#[derive(Error, Debug)]
pub enum LingocastError {
    /// Feed could not be fetched or parsed
    #[error("Feed error: {0}")]
    Feed(String),

    /// Article body could not be fetched from the GraphQL endpoint
    #[error("Content error: {0}")]
    Content(String),

    /// LLM API request failed or returned an unusable reply
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Date in the feed could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    /// Caller supplied something unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Lingocast operations
pub type Result<T> = std::result::Result<T, LingocastError>;

/// Convert anyhow::Error to LingocastError
impl From<anyhow::Error> for LingocastError {
    fn from(err: anyhow::Error) -> Self {
        LingocastError::Other(err.to_string())
    }
}
