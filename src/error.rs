// src/error.rs

//! Unified error handling for the catalog fetcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failure or non-2xx HTTP status
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream API answered with a non-"ok" status
    #[error("Remote API error for {context}: {message}")]
    Remote { context: String, message: String },

    /// Persisted cache failed structural validation
    #[error("Malformed cache: {0}")]
    MalformedCache(String),

    /// Image download failed
    #[error("Asset fetch failed for {url}: {message}")]
    AssetFetch { url: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a remote API error with context.
    pub fn remote(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Remote {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed cache error.
    pub fn malformed_cache(reason: impl Into<String>) -> Self {
        Self::MalformedCache(reason.into())
    }

    /// Create an asset fetch error.
    pub fn asset_fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::AssetFetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the pipeline may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedCache(_) | Self::AssetFetch { .. })
    }
}
