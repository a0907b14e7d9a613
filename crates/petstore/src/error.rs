//! Error types for Petstore operations.
//!
//! Errors are categorized so callers can tell an absent pet apart from a
//! failure worth retrying.

use std::fmt;

/// Result type alias for Petstore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Petstore errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The remote reported the pet as absent.
    NotFound,
    /// Network failure or non-2xx response (transient, retryable).
    Network,
    /// A body could not be encoded or decoded.
    Format,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Pet not found",
            Self::Network => "Petstore request failed",
            Self::Format => "Invalid pet payload",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the Petstore API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The remote answered 404 for the requested pet.
    #[error("pet not found: {message}")]
    NotFound {
        /// Response body returned with the 404.
        message: String,
    },

    /// Any other failed request: connection errors or non-2xx responses.
    #[error("petstore request failed{}: {message}", fmt_status(.status))]
    Transport {
        /// HTTP status code if a response was received.
        status: Option<u16>,
        /// Response body text or the underlying error message.
        message: String,
    },

    /// A response body could not be decoded into a pet.
    #[error("invalid petstore response: {0}")]
    InvalidResponse(String),

    /// A request body could not be encoded.
    #[error("cannot encode pet: {0}")]
    Encode(String),
}

impl Error {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status,
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Transport { .. } => ErrorCategory::Network,
            Error::InvalidResponse(_) | Error::Encode(_) => ErrorCategory::Format,
        }
    }

    /// Whether the remote reported the pet as absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Classify a non-2xx response by status code.
///
/// 404 becomes [`Error::NotFound`]; every other status becomes
/// [`Error::Transport`] carrying the body as diagnostic text.
#[must_use]
pub fn classify_status(status: u16, body: String) -> Error {
    match status {
        404 => Error::NotFound { message: body },
        _ => Error::Transport {
            status: Some(status),
            message: body,
        },
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => classify_status(code, format!("HTTP {code}")),
            other => Self::Transport {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
