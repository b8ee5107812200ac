//! Error taxonomy for business operations
//!
//! Business handles report failures as [`BusinessError`], tagged once with an
//! [`ErrorKind`] where the error is raised. The dispatcher only looks at the
//! kind, never at the message.
//!
//! # Example
//!
//! ```rust
//! use crud_dispatch::handlers::{BusinessError, ErrorKind, Operation};
//! use axum::http::StatusCode;
//!
//! let error = BusinessError::conflict("duplicate email");
//! assert_eq!(error.kind(), ErrorKind::Conflict);
//! assert_eq!(Operation::Create.classify(error.kind()), ErrorKind::Conflict);
//! assert_eq!(
//!     Operation::Update.classify(error.kind()).status_code(),
//!     StatusCode::INTERNAL_SERVER_ERROR,
//! );
//! ```

use std::fmt;

use axum::http::StatusCode;
use once_cell::sync::OnceCell;

/// Message carried by errors raised without one.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

static DEFAULT_MESSAGE: OnceCell<String> = OnceCell::new();

/// Install the process-wide default error message.
///
/// Only the first call has an effect. Returns `false` if a message was
/// already installed.
pub fn install_default_message(message: impl Into<String>) -> bool {
    DEFAULT_MESSAGE.set(message.into()).is_ok()
}

/// The process-wide default error message
///
/// Falls back to [`DEFAULT_ERROR_MESSAGE`] when nothing was installed.
pub fn default_error_message() -> &'static str {
    DEFAULT_MESSAGE
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
}

/// Operation exposed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Listing every record
    List,
    /// Listing records matching a filter
    ListFiltered,
    /// Getting a single record by ID
    GetById,
    /// Creating a new record
    Create,
    /// Replacing an existing record
    Update,
    /// Partially updating an existing record
    Patch,
    /// Removing a record by ID
    Remove,
    /// Deleting a record by ID with a request body
    Delete,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Operation; 8] = [
        Self::List,
        Self::ListFiltered,
        Self::GetById,
        Self::Create,
        Self::Update,
        Self::Patch,
        Self::Remove,
        Self::Delete,
    ];

    /// Status code emitted when the operation succeeds
    #[must_use]
    pub const fn success_status(&self) -> StatusCode {
        match self {
            Self::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    /// Whether this operation returns a collection envelope
    #[must_use]
    pub const fn returns_collection(&self) -> bool {
        matches!(self, Self::List | Self::ListFiltered)
    }

    /// Whether a [`ErrorKind::Conflict`] raised here is reported as a conflict
    ///
    /// Only creation checks for resource conflicts; elsewhere a conflict is
    /// handled as an unexpected error.
    #[must_use]
    pub const fn recognizes_conflict(&self) -> bool {
        matches!(self, Self::Create)
    }

    /// Classify a raised error kind for this operation
    #[must_use]
    pub const fn classify(&self, kind: ErrorKind) -> ErrorKind {
        match kind {
            ErrorKind::Validation => ErrorKind::Validation,
            ErrorKind::Conflict if self.recognizes_conflict() => ErrorKind::Conflict,
            ErrorKind::Conflict | ErrorKind::Unexpected => ErrorKind::Unexpected,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::ListFiltered => write!(f, "list_filtered"),
            Self::GetById => write!(f, "get_by_id"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Patch => write!(f, "patch"),
            Self::Remove => write!(f, "remove"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of business error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client input or a business precondition was rejected
    Validation,
    /// The request collides with the current resource state
    Conflict,
    /// Anything else
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

impl ErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        format!("{}", self).to_uppercase()
    }

    /// Whether the message of an error of this kind may be shown to clients
    #[must_use]
    pub const fn is_client_safe(&self) -> bool {
        matches!(self, Self::Validation | Self::Conflict)
    }
}

/// Error raised by a business handle
///
/// A missing or empty message is replaced by [`default_error_message`] when
/// read.
///
/// # Example
///
/// ```rust
/// use crud_dispatch::handlers::{default_error_message, BusinessError, ErrorKind};
///
/// let error = BusinessError::validation("name required");
/// assert_eq!(error.message(), "name required");
///
/// let error = BusinessError::without_message(ErrorKind::Unexpected);
/// assert_eq!(error.message(), default_error_message());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessError {
    kind: ErrorKind,
    message: Option<String>,
}

impl BusinessError {
    /// Create a new business error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            message: (!message.is_empty()).then_some(message),
        }
    }

    /// Create an error that carries no message of its own
    pub fn without_message(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an error for a rejected business procedure
    ///
    /// Reported exactly like a validation error.
    pub fn procedure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// The kind assigned where the error was raised
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error message, or the default message when none was given
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| default_error_message())
    }

    /// Whether the error carried its own message
    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    /// Whether the message may be shown to clients
    pub fn is_client_safe(&self) -> bool {
        self.kind.is_client_safe()
    }
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message())
    }
}

impl std::error::Error for BusinessError {}

impl From<std::io::Error> for BusinessError {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for BusinessError {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err.to_string())
    }
}

impl From<anyhow::Error> for BusinessError {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string())
    }
}
