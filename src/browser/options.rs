//! Page-level resolution options.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webdriver_query::{PageOptions, SleeperPolicy};
//!
//! let options = PageOptions::new()
//!     .with_backoff(Duration::from_millis(50), Duration::from_millis(500))
//!     .with_search_attempts(5)
//!     .with_trace();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::retry::SleeperPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Default number of `DOM.performSearch` attempts per search.
pub const DEFAULT_SEARCH_ATTEMPTS: usize = 3;

// ============================================================================
// PageOptions
// ============================================================================

/// Resolution defaults for a [`Page`](crate::Page).
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Policy used between polling attempts, copied into derived elements.
    pub sleeper: SleeperPolicy,

    /// Attempts per full-text search.
    pub search_attempts: usize,

    /// Show an on-page marker for every query attempt.
    pub trace: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl PageOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            sleeper: SleeperPolicy::default(),
            search_attempts: DEFAULT_SEARCH_ATTEMPTS,
            trace: false,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl PageOptions {
    /// Sets the default sleeper policy.
    #[inline]
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: SleeperPolicy) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Uses exponential backoff between `initial` and `max`.
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.sleeper = SleeperPolicy::backoff(initial, max);
        self
    }

    /// Sets the number of attempts per full-text search.
    ///
    /// Zero is raised to one.
    #[inline]
    #[must_use]
    pub fn with_search_attempts(mut self, attempts: usize) -> Self {
        self.search_attempts = attempts.max(1);
        self
    }

    /// Enables on-page query markers.
    #[inline]
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
