//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Provider rejected or could not be given credentials
    #[error("{message}")]
    AuthError {
        message: String,
    },

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Character quota exceeded on the provider side
    #[error("Quota exceeded: {message}")]
    QuotaExceededError {
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Service account key could not be read or used
    #[error("Credentials error: {path} - {message}")]
    CredentialsError {
        path: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JWT signing error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Usage store error
    #[error("Store error: {0}")]
    StoreError(#[from] rusqlite::Error),

    /// Blocking task failed to complete
    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    /// Template registration error
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    /// Template rendering error
    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
