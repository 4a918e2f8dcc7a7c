use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Timeout Error: {0}")]
    Timeout(String),

    #[error("Unsupported Language: {0}")]
    UnsupportedLanguage(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("System Error: {0}")]
    System(String),
}

/// Failure categories carried on a `TranslationResult`.
///
/// Empty input is a successful no-op, so it never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Transient transport failure, including unreadable provider responses
    NetworkError,
    /// No response within the request bound
    Timeout,
    /// The provider cannot service the language pair
    UnsupportedLanguage,
}

impl ErrorKind {
    /// Whether the fallback dictionary may stand in for the remote provider.
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorKind::NetworkError | ErrorKind::Timeout)
    }
}

impl AppError {
    /// Classify this error for the translation tiering.
    ///
    /// Only timeouts and unsupported pairs get their own category; everything else the
    /// provider can throw at us is treated as a recoverable transport failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Timeout(_) => ErrorKind::Timeout,
            AppError::UnsupportedLanguage(_) => ErrorKind::UnsupportedLanguage,
            _ => ErrorKind::NetworkError,
        }
    }
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
