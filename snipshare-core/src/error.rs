//! Error types for snipshare-core

use thiserror::Error;

/// Main error type for the snipshare-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// The API answered with a non-success status.
    ///
    /// `message` is the envelope's `message` field, or the caller's
    /// fallback text when the body carried none.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Transport failure (connect, timeout, undecodable body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Local key/value storage failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Message suitable for an inline error panel or a notice.
    ///
    /// API errors already carry the envelope message; transport errors are
    /// replaced by `fallback` so users never see raw connection text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            Error::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias for snipshare-core
pub type Result<T> = std::result::Result<T, Error>;
