//! Browser entities module.
//!
//! This module provides the element resolution types:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | Remote document handle |
//! | [`Element`] | DOM node handle |
//! | [`SearchResult`] | Open full-text search session |
//! | [`RaceContext`] | First-match race builder |
//! | [`Elements`], [`Pages`] | List helpers |
//!
//! # Example
//!
//! ```ignore
//! use webdriver_query::{Page, PageId, Result};
//!
//! # async fn example(dispatcher: std::sync::Arc<dyn webdriver_query::Dispatcher>) -> Result<()> {
//! let page = Page::new(PageId::new("target-1"), None, dispatcher);
//!
//! let form = page.element("form").await?;
//! let inputs = form.elements("input").await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Element and page lists.
pub mod collections;

/// DOM element handles.
pub mod element;

/// Remote evaluation options.
pub mod eval;

/// Page-level options.
pub mod options;

/// Remote document handles.
pub mod page;

/// Locator strategies.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use collections::{Elements, Pages};
pub use element::Element;
pub use eval::EvalOptions;
pub use options::{DEFAULT_SEARCH_ATTEMPTS, PageOptions};
pub use page::{Domain, DomainGuard, Page, RaceContext, SearchResult};
pub use selector::Selector;
