//! Full-text DOM search.
//!
//! A search runs `DOM.performSearch` against the whole document, including
//! user-agent shadow roots and iframes. The query may be plain text, a CSS
//! selector or an XPath.

use parking_lot::Mutex;
use tracing::debug;

use crate::browser::{Element, Elements};
use crate::error::{Error, Result};
use crate::identifiers::SearchId;
use crate::protocol::{DomCommand, GetSearchResultsResult, PerformSearchResult};
use crate::retry::{self, Attempt, RetryOptions};

use super::Page;
use super::core::{Domain, DomainGuard};

// ============================================================================
// SearchResult
// ============================================================================

/// An open search session.
///
/// Holds the `DOM` domain enabled until [`release`](Self::release) is
/// called. Sessions are not released implicitly.
#[derive(Debug)]
#[must_use = "call `release` to end the search session"]
pub struct SearchResult {
    page: Page,
    search: Option<PerformSearchResult>,
    first: Option<Element>,
    restore: DomainGuard,
}

impl SearchResult {
    /// Returns the first match, if any attempt found one.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Element> {
        self.first.as_ref()
    }

    /// Returns the number of matches reported by the last attempt.
    #[inline]
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.search.as_ref().map_or(0, |s| s.result_count)
    }

    /// Returns the remote search id.
    #[inline]
    #[must_use]
    pub fn search_id(&self) -> Option<&SearchId> {
        self.search.as_ref().map(|s| &s.search_id)
    }

    /// Resolves `count` matches starting at `from`.
    ///
    /// A `count` of zero returns an empty list without a remote call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `from + count` overflows.
    pub async fn get(&self, from: usize, count: usize) -> Result<Elements> {
        let Some(search_id) = self.search_id() else {
            return Ok(Elements::default());
        };
        if count == 0 {
            return Ok(Elements::default());
        }
        let to = from
            .checked_add(count)
            .ok_or_else(|| Error::invalid_argument("search result range overflows"))?;

        let nodes: GetSearchResultsResult = self
            .page
            .call_as(
                DomCommand::GetSearchResults {
                    search_id: search_id.clone(),
                    from_index: from,
                    to_index: to,
                }
                .into(),
            )
            .await?;

        let mut elements = Vec::with_capacity(nodes.node_ids.len());
        for node_id in nodes.node_ids {
            elements.push(self.page.element_from_node(node_id).await?);
        }
        Ok(Elements::from(elements))
    }

    /// Resolves every match.
    pub async fn all(&self) -> Result<Elements> {
        self.get(0, self.result_count()).await
    }

    /// Restores the `DOM` domain and discards the remote session.
    ///
    /// Failures are ignored.
    pub async fn release(self) {
        self.restore.restore(&self.page).await;
        if let Some(search) = &self.search {
            self.page.discard_search(&search.search_id).await;
        }
    }
}

// ============================================================================
// Page - Search
// ============================================================================

impl Page {
    /// Searches the document for `query`.
    ///
    /// Makes up to [`PageOptions::search_attempts`](crate::PageOptions)
    /// attempts, waiting with the page's sleeper between them. Exhausting
    /// the attempts is not an error: the result has no first element.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient remote error. The domain is restored
    /// and the last session discarded before returning.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = page.search("Sign in").await?;
    /// if let Some(button) = result.first() {
    ///     let all = result.all().await?;
    /// }
    /// result.release().await;
    /// ```
    pub async fn search(&self, query: &str) -> Result<SearchResult> {
        debug!(page_id = %self.inner.id, %query, "Searching document");

        let restore = self.enable_domain(Domain::Dom).await?;

        let last: Mutex<Option<PerformSearchResult>> = Mutex::new(None);
        let options = RetryOptions::new(
            self.context.clone(),
            self.sleeper.clone(),
            self.inner.options.search_attempts,
        );
        let (page, last_ref) = (self, &last);

        let outcome = retry::retry(options, move || async move {
            page.search_attempt(query, last_ref).await
        })
        .await;

        let search = last.into_inner();
        match outcome {
            Ok(outcome) => Ok(SearchResult {
                page: self.clone(),
                search,
                first: outcome.success(),
                restore,
            }),
            Err(err) => {
                if let Some(search) = &search {
                    self.discard_search(&search.search_id).await;
                }
                restore.restore(self).await;
                Err(err)
            }
        }
    }

    /// One search attempt. `last` holds the session of the previous attempt.
    async fn search_attempt(
        &self,
        query: &str,
        last: &Mutex<Option<PerformSearchResult>>,
    ) -> Result<Attempt<Element>> {
        let previous = last.lock().take();
        if let Some(previous) = previous {
            self.discard_search(&previous.search_id).await;
        }

        let search: PerformSearchResult = self
            .call_as(
                DomCommand::PerformSearch {
                    query: query.to_string(),
                    include_user_agent_shadow_dom: true,
                }
                .into(),
            )
            .await?;
        let search_id = search.search_id.clone();
        let result_count = search.result_count;
        *last.lock() = Some(search);

        if result_count == 0 {
            return Ok(Attempt::Retry);
        }

        let nodes = match self
            .call_as::<GetSearchResultsResult>(
                DomCommand::GetSearchResults {
                    search_id,
                    from_index: 0,
                    to_index: 1,
                }
                .into(),
            )
            .await
        {
            Ok(nodes) => nodes,
            Err(err) if err.is_transient() => return Ok(Attempt::Retry),
            Err(err) => return Err(err),
        };

        let Some(&node_id) = nodes.node_ids.first() else {
            return Ok(Attempt::Retry);
        };

        // Node id 0 means the node was replaced. Fetching the document
        // makes the remote end assign fresh ids.
        if node_id.is_replaced() {
            let _ = self
                .call(DomCommand::GetDocument { depth: Some(0) }.into())
                .await;
            return Ok(Attempt::Retry);
        }

        match self.element_from_node(node_id).await {
            Ok(element) => Ok(Attempt::Done(element)),
            Err(err) if err.is_transient() => Ok(Attempt::Retry),
            Err(err) => Err(err),
        }
    }

    /// Discards a search session. Failures are ignored.
    async fn discard_search(&self, search_id: &SearchId) {
        let _ = self
            .call(
                DomCommand::DiscardSearchResults {
                    search_id: search_id.clone(),
                }
                .into(),
            )
            .await;
    }
}

// ============================================================================
// Tests
// ============================================================================
