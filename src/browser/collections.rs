//! Element and page list helpers.

use std::ops::Deref;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

use super::eval::js;
use super::{Element, Page};

// ============================================================================
// Elements
// ============================================================================

/// An ordered list of elements.
///
/// Dereferences to a slice, so `first`, `last`, `len`, `is_empty` and
/// `iter` come from [`[Element]`](slice).
#[derive(Debug, Clone, Default)]
pub struct Elements(Vec<Element>);

impl Elements {
    /// Consumes the list and returns the inner vector.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Element> {
        self.0
    }
}

impl Deref for Elements {
    type Target = [Element];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Element>> for Elements {
    fn from(elements: Vec<Element>) -> Self {
        Self(elements)
    }
}

impl FromIterator<Element> for Elements {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Elements {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// An ordered list of pages.
#[derive(Debug, Clone, Default)]
pub struct Pages(Vec<Page>);

impl Pages {
    /// Consumes the list and returns the inner vector.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Page> {
        self.0
    }

    /// Returns the first page with an element matching a CSS selector.
    ///
    /// Each page is checked once, without polling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageNotFound`] if no page matches, or the first
    /// lookup error that is not "not found".
    pub async fn find(&self, selector: &str) -> Result<Page> {
        for page in &self.0 {
            if page.has(selector).await?.is_some() {
                return Ok(page.clone());
            }
        }
        debug!(%selector, pages = self.0.len(), "No page matched selector");
        Err(Error::PageNotFound)
    }

    /// Returns the first page whose URL matches `pattern`.
    ///
    /// # Errors
    ///
    /// - [`Error::Regex`] if the pattern does not compile
    /// - [`Error::PageNotFound`] if no page matches
    pub async fn find_by_url(&self, pattern: &str) -> Result<Page> {
        let re = Regex::new(pattern)?;
        for page in &self.0 {
            let url = page.eval_value(js::LOCATION_HREF).await?;
            if url.as_str().is_some_and(|url| re.is_match(url)) {
                return Ok(page.clone());
            }
        }
        debug!(%pattern, pages = self.0.len(), "No page matched URL");
        Err(Error::PageNotFound)
    }
}

impl Deref for Pages {
    type Target = [Page];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Page>> for Pages {
    fn from(pages: Vec<Page>) -> Self {
        Self(pages)
    }
}

impl FromIterator<Page> for Pages {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Pages {
    type Item = Page;
    type IntoIter = std::vec::IntoIter<Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
