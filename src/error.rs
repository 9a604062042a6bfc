// src/error.rs

//! Unified error handling for the repost service.

use std::fmt;

use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page fetch failed after exhausting retries
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A structured data block failed to parse
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The publish target rejected the bot
    #[error("permission error: {0}")]
    Permission(String),

    /// Messaging API failure
    #[error("publish API error: {0}")]
    PublishApi(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Seen-set database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client failure outside the retrying fetch path
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a fetch error carrying the last observed cause.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    /// Create a publish API error.
    pub fn publish_api(message: impl Into<String>) -> Self {
        Self::PublishApi(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
