//! Error types for element resolution.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webdriver_query::{Page, Result};
//!
//! async fn example(page: &Page) -> Result<()> {
//!     let button = page.element("#submit").await?;
//!     let label = button.element("span").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Recovery |
//! |----------|----------|----------|
//! | Not found | [`Error::ElementNotFound`], [`Error::PageNotFound`] | drives retry and race fallthrough |
//! | Shape mismatch | [`Error::ExpectElement`], [`Error::ExpectElements`] | none, surfaced immediately |
//! | Transient | [`Error::ContextNotFound`], [`Error::SearchSessionNotFound`] | retried up to the bound |
//! | Cancelled | [`Error::Cancelled`], [`Error::DeadlineExceeded`], [`Error::MaxSleepCount`] | none |
//! | Protocol | [`Error::Protocol`], [`Error::Eval`], [`Error::Connection`], [`Error::InvalidArgument`] | none |
//! | External | [`Error::Json`], [`Error::Regex`] | none |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

/// CDP error message for an execution context that no longer exists.
pub(crate) const CONTEXT_NOT_FOUND_MESSAGE: &str = "Cannot find context with specified id";

/// CDP error message for a discarded or unknown search session.
pub(crate) const SEARCH_SESSION_NOT_FOUND_MESSAGE: &str = "No search session with given id found";

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Not Found
    // ========================================================================
    /// No element matched.
    ///
    /// Returned by fail-fast lookups. Races and `has` helpers treat it as
    /// "try something else" rather than as a failure.
    #[error("Element not found")]
    ElementNotFound,

    /// No page in a [`Pages`](crate::Pages) list matched.
    #[error("Page not found")]
    PageNotFound,

    // ========================================================================
    // Shape Mismatch
    // ========================================================================
    /// The remote value was expected to be a DOM node.
    #[error("Expected a node, got: {description}")]
    ExpectElement {
        /// Short description of the remote value received.
        description: String,
    },

    /// The remote value was expected to be an array of DOM nodes.
    #[error("Expected a node list, got: {description}")]
    ExpectElements {
        /// Short description of the remote value received.
        description: String,
    },

    // ========================================================================
    // Transient
    // ========================================================================
    /// The execution context was destroyed, usually by a navigation.
    #[error("Execution context not found")]
    ContextNotFound,

    /// The DOM search session was invalidated on the remote end.
    #[error("Search session not found")]
    SearchSessionNotFound,

    // ========================================================================
    // Cancellation
    // ========================================================================
    /// The [`Context`](crate::Context) was cancelled.
    #[error("Context cancelled")]
    Cancelled,

    /// The [`Context`](crate::Context) deadline passed.
    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    /// A counting sleeper ran out of sleeps.
    #[error("Max sleep count {max} exceeded")]
    MaxSleepCount {
        /// Number of sleeps the sleeper allowed.
        max: usize,
    },

    // ========================================================================
    // Protocol
    // ========================================================================
    /// Remote call failed.
    #[error("Protocol error {code}: {message}")]
    Protocol {
        /// Remote error code.
        code: i64,
        /// Remote error message.
        message: String,
    },

    /// The evaluated script threw.
    #[error("Eval error: {message}")]
    Eval {
        /// Exception text reported by the remote end.
        message: String,
    },

    /// The dispatcher could not deliver a request.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the transport failure.
        message: String,
    },

    /// Invalid argument or API misuse.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid regular expression.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

// ============================================================================
// ErrorKind
// ============================================================================

/// Coarse classification of an [`enum@Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected absence. Drives retry and race fallthrough.
    NotFound,
    /// A remote value was present but had the wrong shape.
    ShapeMismatch,
    /// Remote state was invalidated; the operation may succeed on retry.
    Transient,
    /// The context was cancelled or a sleeper gave up.
    Cancelled,
    /// Any other failure.
    Fatal,
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a protocol error.
    #[inline]
    pub fn protocol(code: i64, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
        }
    }

    /// Creates an eval error.
    #[inline]
    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an expect-element error.
    #[inline]
    pub fn expect_element(description: impl Into<String>) -> Self {
        Self::ExpectElement {
            description: description.into(),
        }
    }

    /// Creates an expect-elements error.
    #[inline]
    pub fn expect_elements(description: impl Into<String>) -> Self {
        Self::ExpectElements {
            description: description.into(),
        }
    }

    /// Maps a remote error code and message onto the crate taxonomy.
    ///
    /// Invalidated contexts and search sessions are recognised by message
    /// and become their transient variants.
    #[must_use]
    pub fn from_remote(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(CONTEXT_NOT_FOUND_MESSAGE) {
            Self::ContextNotFound
        } else if message.contains(SEARCH_SESSION_NOT_FOUND_MESSAGE) {
            Self::SearchSessionNotFound
        } else {
            Self::protocol(code, message)
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns the coarse category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ElementNotFound | Self::PageNotFound => ErrorKind::NotFound,
            Self::ExpectElement { .. } | Self::ExpectElements { .. } => ErrorKind::ShapeMismatch,
            Self::ContextNotFound | Self::SearchSessionNotFound => ErrorKind::Transient,
            Self::Cancelled | Self::DeadlineExceeded | Self::MaxSleepCount { .. } => {
                ErrorKind::Cancelled
            }
            Self::Protocol { .. }
            | Self::Eval { .. }
            | Self::Connection { .. }
            | Self::InvalidArgument { .. }
            | Self::Json(_)
            | Self::Regex(_) => ErrorKind::Fatal,
        }
    }

    /// Returns `true` if this is an element not found error.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound)
    }

    /// Returns `true` if a remote value had the wrong shape.
    #[inline]
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        self.kind() == ErrorKind::ShapeMismatch
    }

    /// Returns `true` if remote state was invalidated underneath a call.
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Returns `true` if the context was cancelled or its deadline passed.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::Transient)
    }
}

// ============================================================================
// Tests
// ============================================================================
