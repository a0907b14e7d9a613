//! Error taxonomy for reconciliation.
//!
//! "External resource absent" is not an error here: clients report it as a
//! missing observation. What remains is split into transport failures,
//! malformed external data and misconfiguration.

use std::fmt;

/// Boxed error from an external client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for reconciliation.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Call to the external system failed.
    Transport,
    /// The external system returned data the controller cannot use.
    Malformed,
    /// The record or its configuration is wrong; retrying will not help.
    Misconfigured,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "External call failed",
            Self::Malformed => "Malformed external resource",
            Self::Misconfigured => "Invalid resource or configuration",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while reconciling a managed record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record handed to a controller is of another kind.
    #[error("managed resource '{name}' is a {found}, expected {expected}")]
    WrongResourceType {
        name: String,
        expected: String,
        found: String,
    },

    /// The record's desired parameters do not parse.
    #[error("invalid spec for '{name}': {message}")]
    InvalidSpec { name: String, message: String },

    /// The bound external name is not usable as an identity.
    #[error("invalid external name '{0}'")]
    InvalidExternalName(String),

    /// A fetched resource lacks required data, e.g. its identity.
    #[error("malformed external resource: {0}")]
    MalformedResource(String),

    /// No client could be built for the record.
    #[error("cannot connect: {0}")]
    Connect(String),

    /// Fetching the external resource failed.
    #[error("cannot observe external resource: {source}")]
    Observe {
        retryable: bool,
        #[source]
        source: BoxError,
    },

    /// Creating the external resource failed; nothing was bound.
    #[error("cannot create external resource: {source}")]
    CreateFailed {
        retryable: bool,
        #[source]
        source: BoxError,
    },

    /// Updating the external resource failed; the binding is kept.
    #[error("cannot update external resource: {source}")]
    UpdateFailed {
        retryable: bool,
        #[source]
        source: BoxError,
    },

    /// Deleting the external resource failed.
    #[error("cannot delete external resource: {source}")]
    DeleteFailed {
        retryable: bool,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Wrap a failed fetch.
    pub fn observe(source: impl Into<BoxError>, retryable: bool) -> Self {
        Self::Observe {
            retryable,
            source: source.into(),
        }
    }

    /// Wrap a failed create.
    pub fn create_failed(source: impl Into<BoxError>, retryable: bool) -> Self {
        Self::CreateFailed {
            retryable,
            source: source.into(),
        }
    }

    /// Wrap a failed update.
    pub fn update_failed(source: impl Into<BoxError>, retryable: bool) -> Self {
        Self::UpdateFailed {
            retryable,
            source: source.into(),
        }
    }

    /// Wrap a failed delete.
    pub fn delete_failed(source: impl Into<BoxError>, retryable: bool) -> Self {
        Self::DeleteFailed {
            retryable,
            source: source.into(),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Observe { .. }
            | Error::CreateFailed { .. }
            | Error::UpdateFailed { .. }
            | Error::DeleteFailed { .. } => ErrorCategory::Transport,
            Error::MalformedResource(_) => ErrorCategory::Malformed,
            Error::WrongResourceType { .. }
            | Error::InvalidSpec { .. }
            | Error::InvalidExternalName(_)
            | Error::Connect(_) => ErrorCategory::Misconfigured,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Observe { retryable, .. }
            | Error::CreateFailed { retryable, .. }
            | Error::UpdateFailed { retryable, .. }
            | Error::DeleteFailed { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// The external client's error, for transport failures.
    pub fn external_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Observe { source, .. }
            | Error::CreateFailed { source, .. }
            | Error::UpdateFailed { source, .. }
            | Error::DeleteFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
