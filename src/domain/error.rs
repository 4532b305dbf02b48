//! Domain-level error types for chatsync.
//!
//! All errors are typed with `thiserror` and carry enough context to be
//! printed directly at the command boundary.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration (no organization, no project, no local path).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The provider answered, but with an error status.
    #[error("Provider error{}: {message}", status_suffix(.status))]
    Provider { message: String, status: Option<u16> },

    /// Transport-level failure talking to the provider.
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Invalid or unexpected data.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Batch deletion kept re-listing chats without making progress.
    #[error(
        "Chat deletion stalled after {pages} pages ({deleted} deleted, {failed} failed)"
    )]
    DeletionStalled {
        deleted: usize,
        failed: usize,
        pages: usize,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a provider error with an optional HTTP status.
    pub fn provider(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Provider {
            message: message.into(),
            status,
        }
    }

    /// Create a transport error from reqwest.
    pub fn http(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether the error came from the remote side (provider or transport).
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Http { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = AppError::provider("forbidden", Some(403));
        assert_eq!(err.to_string(), "Provider error (403): forbidden");

        let err = AppError::provider("boom", None);
        assert_eq!(err.to_string(), "Provider error: boom");
        assert!(err.is_remote());
    }

    #[test]
    fn test_stalled_display() {
        let err = AppError::DeletionStalled {
            deleted: 100,
            failed: 150,
            pages: 5,
        };
        assert_eq!(
            err.to_string(),
            "Chat deletion stalled after 5 pages (100 deleted, 150 failed)"
        );
        assert!(!err.is_remote());
    }
}
