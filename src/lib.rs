//! WebDriver Query - Remote element resolution for browser automation.
//!
//! This library resolves DOM elements in a remote browser page over a
//! Chrome DevTools Protocol style command channel. It polls for elements
//! that are not there yet, runs full-text DOM searches, and races several
//! selectors against each other.
//!
//! # Architecture
//!
//! The library sits between application code and a command transport:
//!
//! - **Local End (Rust)**: Builds typed commands, classifies results and
//!   decides when to try again
//! - **Remote End (Browser)**: Evaluates query functions and runs searches
//!
//! Key design principles:
//!
//! - The transport is a [`Dispatcher`] trait object supplied by the caller
//! - Every retrying behavior goes through [`retry::retry`] or [`retry::poll`]
//! - Waiting is delegated to a pluggable [`Sleeper`]; cancellation and
//!   deadlines are only observed there
//! - "Not found" is an outcome, not a failure: it drives retries and race
//!   fallthrough
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use webdriver_query::{Dispatcher, Page, PageId, Result};
//!
//! async fn login(dispatcher: Arc<dyn Dispatcher>) -> Result<()> {
//!     let page = Page::new(PageId::new("target-1"), None, dispatcher)
//!         .with_timeout(Duration::from_secs(10));
//!
//!     // Wait for the form, then look inside it without waiting
//!     let form = page.element("form#login").await?;
//!     let email = form.element("input[type=email]").await?;
//!
//!     // Whichever shows up first
//!     let outcome = page
//!         .race()
//!         .element("#dashboard")
//!         .element_r(".alert", "/invalid password/i")
//!         .run()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Resolution entities: [`Page`], [`Element`], [`SearchResult`], [`RaceContext`] |
//! | [`context`] | Cancellation and deadlines |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Command and result message types |
//! | [`retry`] | Retry loops and sleeper policies |
//! | [`transport`] | Call-dispatch seam |

// ============================================================================
// Modules
// ============================================================================

/// Resolution entities: Page, Element, SearchResult, RaceContext.
///
/// - [`Page`] - Remote document handle
/// - [`Element`] - DOM node handle
/// - [`Elements`] / [`Pages`] - List helpers
pub mod browser;

/// Cancellation and deadline token.
pub mod context;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for remote entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Remote protocol message types.
pub mod protocol;

/// Bounded retry, unbounded polling and wait policies.
pub mod retry;

/// Call-dispatch seam.
///
/// Implement [`Dispatcher`] over a real connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{
    DEFAULT_SEARCH_ATTEMPTS, Domain, DomainGuard, Element, Elements, EvalOptions, Page,
    PageOptions, Pages, RaceContext, SearchResult, Selector,
};

// Context
pub use context::Context;

// Error types
pub use error::{Error, ErrorKind, Result};

// Identifier types
pub use identifiers::{NodeId, PageId, RemoteObjectId, RequestId, SearchId, SessionId};

// Protocol types
pub use protocol::{RemoteObject, RemoteValueKind, Request, Response};

// Retry types
pub use retry::{Attempt, Outcome, RetryOptions, Sleeper, SleeperPolicy};

// Transport
pub use transport::Dispatcher;
