//! Remote document handles and element resolution.
//!
//! Each [`Page`] is a cheap handle over a shared [`Dispatcher`](crate::Dispatcher)
//! with its own [`Context`](crate::Context) and [`SleeperPolicy`](crate::SleeperPolicy).
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Page struct, accessors, evaluation and domain state |
//! | `elements` | Polling element resolution and node lists |
//! | `search` | Full-text DOM search sessions |
//! | `race` | First-match races between conditions |
//!
//! # Example
//!
//! ```ignore
//! let page = Page::new(PageId::new(target_id), Some(session_id), dispatcher);
//!
//! // Poll until present
//! let button = page.element("#submit").await?;
//!
//! // One-shot lists
//! let rows = page.elements_x("//table//tr").await?;
//!
//! // Fail fast
//! if page.has(".error").await?.is_some() { /* ... */ }
//!
//! // Bounded by a timeout
//! let slow = page.with_timeout(Duration::from_secs(5)).element(".lazy").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod elements;
mod race;
mod search;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{Domain, DomainGuard, Page};
pub use race::RaceContext;
pub use search::SearchResult;
