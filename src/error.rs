// src/error.rs

//! Unified error handling for the helper bot.

use std::fmt;

use thiserror::Error;

/// Result type alias for helper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Retry budget exhausted while fetching a page
    #[error("Fetching {url} failed after {attempts} attempt(s): {source}")]
    Fetch {
        url: String,
        attempts: u32,
        #[source]
        source: Box<AppError>,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Syndicated feed could not be read
    #[error("Feed error: {0}")]
    Feed(String),

    /// Document did not have the expected shape
    #[error("Extraction error for {topic}: {message}")]
    Extraction { topic: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an extraction error with the topic it happened in.
    pub fn extraction(topic: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            topic: topic.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from the network rather than from parsing.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Http(_) | Self::Status { .. } => true,
            Self::Fetch { .. } => true,
            _ => false,
        }
    }
}
