//! DOM element handles and element-scoped queries.
//!
//! An [`Element`] wraps a remote node object. It is valid for the document
//! generation it was resolved in; using it after a navigation is reported
//! by the remote end, not detected locally.
//!
//! # Example
//!
//! ```ignore
//! let form = page.element("form#login").await?;
//!
//! // Scoped lookups fail fast
//! let email = form.element("input[name='email']").await?;
//! let rows = form.elements_x(".//tr").await?;
//!
//! // Tree navigation
//! let container = form.parent().await?;
//! let sections = email.parents("section").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;
use crate::identifiers::RemoteObjectId;
use crate::protocol::RemoteObject;
use crate::retry::SleeperPolicy;

use super::eval::js;
use super::{Elements, EvalOptions, Page, Selector};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for an element.
pub(crate) struct ElementInner {
    /// Remote handle.
    pub object_id: RemoteObjectId,

    /// Remote object as returned by the resolver.
    pub object: RemoteObject,

    /// Owning page.
    pub page: Page,
}

// ============================================================================
// Element
// ============================================================================

/// A handle to a DOM node in a remote document.
///
/// Cloning is cheap. The remote handle is never released implicitly; call
/// [`release`](Self::release) when done with long-lived pages.
#[derive(Clone)]
pub struct Element {
    /// Shared inner state.
    pub(crate) inner: Arc<ElementInner>,
    context: Context,
    sleeper: SleeperPolicy,
}

// ============================================================================
// Element - Display
// ============================================================================

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("object_id", &self.inner.object_id)
            .field("page_id", self.inner.page.id())
            .field("sleeper", &self.sleeper)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Element - Constructor
// ============================================================================

impl Element {
    /// Creates an element handle inheriting the page's context and sleeper.
    pub(crate) fn new(object_id: RemoteObjectId, object: RemoteObject, page: Page) -> Self {
        let context = page.context.clone();
        let sleeper = page.sleeper.clone();
        Self {
            inner: Arc::new(ElementInner {
                object_id,
                object,
                page,
            }),
            context,
            sleeper,
        }
    }
}

// ============================================================================
// Element - Accessors
// ============================================================================

impl Element {
    /// Returns the remote handle.
    #[inline]
    #[must_use]
    pub fn object_id(&self) -> &RemoteObjectId {
        &self.inner.object_id
    }

    /// Returns the remote object this element was resolved from.
    #[inline]
    #[must_use]
    pub fn remote_object(&self) -> &RemoteObject {
        &self.inner.object
    }

    /// Returns the owning page.
    #[inline]
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.inner.page
    }

    /// Returns the context scoped queries observe.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the sleeper handed to elements resolved from this one.
    #[inline]
    #[must_use]
    pub fn sleeper(&self) -> &SleeperPolicy {
        &self.sleeper
    }

    /// Returns a clone observing `context`.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Returns a clone using `sleeper` for the elements it resolves.
    #[must_use]
    pub fn with_sleeper(&self, sleeper: SleeperPolicy) -> Self {
        Self {
            sleeper,
            ..self.clone()
        }
    }

    /// Releases the remote handle.
    pub async fn release(&self) -> Result<()> {
        self.inner.page.release(&self.inner.object_id).await
    }
}

// ============================================================================
// Element - Scoped Queries
// ============================================================================

impl Element {
    /// The owning page with this element's context and a fail-fast sleeper.
    fn scope(&self) -> Page {
        self.inner
            .page
            .with_context(self.context.clone())
            .with_sleeper(SleeperPolicy::not_found())
    }

    /// Resolves a JS query function with this element bound as `this`.
    ///
    /// Fails fast with [`Error::ElementNotFound`](crate::Error::ElementNotFound)
    /// on `null`. The result uses this element's sleeper.
    pub async fn element_by_js(&self, opts: EvalOptions) -> Result<Element> {
        let element = self
            .scope()
            .element_by_js(opts.with_this(self.inner.object_id.clone()))
            .await?;
        Ok(element.with_sleeper(self.sleeper.clone()))
    }

    /// Resolves a JS query function returning an array, `this` bound.
    ///
    /// Every element in the list uses this element's sleeper.
    pub async fn elements_by_js(&self, opts: EvalOptions) -> Result<Elements> {
        let elements = self
            .scope()
            .elements_by_js(opts.with_this(self.inner.object_id.clone()))
            .await?;
        Ok(elements
            .into_iter()
            .map(|element| element.with_sleeper(self.sleeper.clone()))
            .collect())
    }

    /// Resolves the first descendant matching a selector.
    pub async fn element_by(&self, selector: &Selector) -> Result<Element> {
        self.element_by_js(selector.first()).await
    }

    /// Resolves the first descendant matching a CSS selector.
    pub async fn element(&self, selector: &str) -> Result<Element> {
        self.element_by(&Selector::css(selector)).await
    }

    /// Resolves the first node matching an XPath relative to this element.
    pub async fn element_x(&self, xpath: &str) -> Result<Element> {
        self.element_by(&Selector::xpath(xpath)).await
    }

    /// Resolves the first descendant matching a CSS selector and text regex.
    pub async fn element_r(&self, selector: &str, regex: &str) -> Result<Element> {
        self.element_by(&Selector::regex(selector, regex)).await
    }

    /// Resolves every descendant matching a selector.
    pub async fn elements_by(&self, selector: &Selector) -> Result<Elements> {
        self.elements_by_js(selector.all()).await
    }

    /// Resolves every descendant matching a CSS selector.
    pub async fn elements(&self, selector: &str) -> Result<Elements> {
        self.elements_by(&Selector::css(selector)).await
    }

    /// Resolves every node matching an XPath relative to this element.
    pub async fn elements_x(&self, xpath: &str) -> Result<Elements> {
        self.elements_by(&Selector::xpath(xpath)).await
    }

    /// Resolves every descendant matching a CSS selector and text regex.
    pub async fn elements_r(&self, selector: &str, regex: &str) -> Result<Elements> {
        self.elements_by(&Selector::regex(selector, regex)).await
    }

    /// Looks a selector up once below this element.
    ///
    /// Returns `Ok(None)` instead of a not-found error.
    pub async fn has_by(&self, selector: &Selector) -> Result<Option<Element>> {
        match self.element_by(selector).await {
            Ok(element) => Ok(Some(element)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Looks a CSS selector up once below this element.
    pub async fn has(&self, selector: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::css(selector)).await
    }

    /// Looks an XPath up once relative to this element.
    pub async fn has_x(&self, xpath: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::xpath(xpath)).await
    }

    /// Looks a CSS selector and text regex up once below this element.
    pub async fn has_r(&self, selector: &str, regex: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::regex(selector, regex)).await
    }
}

// ============================================================================
// Element - Tree Navigation
// ============================================================================

impl Element {
    /// Returns the parent element.
    pub async fn parent(&self) -> Result<Element> {
        self.element_by_js(EvalOptions::helper("parent", js::PARENT, Vec::new()))
            .await
    }

    /// Returns the ancestors matching a CSS selector, nearest first.
    pub async fn parents(&self, selector: &str) -> Result<Elements> {
        self.elements_by_js(EvalOptions::helper(
            "parents",
            js::PARENTS,
            vec![selector.into()],
        ))
        .await
    }

    /// Returns the next sibling element.
    pub async fn next(&self) -> Result<Element> {
        self.element_by_js(EvalOptions::helper("next", js::NEXT, Vec::new()))
            .await
    }

    /// Returns the previous sibling element.
    pub async fn previous(&self) -> Result<Element> {
        self.element_by_js(EvalOptions::helper("previous", js::PREVIOUS, Vec::new()))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
