//! Racing several element conditions.
//!
//! Each round evaluates every branch once, in registration order, with a
//! fail-fast sleeper. The first branch producing an element wins; its
//! callback runs once. Rounds repeat with the page's sleeper in between.
//!
//! # Example
//!
//! ```ignore
//! let element = page
//!     .race()
//!     .element("#dashboard")
//!     .handle(|el| async move { Ok(()) })
//!     .element_r("div.error", "/invalid/i")
//!     .handle(|_| async move { Err(Error::invalid_argument("login rejected")) })
//!     .search("Two-factor code")
//!     .run()
//!     .await?;
//! ```

use std::fmt;
use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::browser::{Element, EvalOptions, Selector};
use crate::error::{Error, Result};
use crate::retry::{self, Attempt, SleeperPolicy};

use super::Page;

// ============================================================================
// Types
// ============================================================================

/// Condition evaluated once per round against a fail-fast page.
type Condition = Box<dyn Fn(Page) -> BoxFuture<'static, Result<Element>> + Send + Sync>;

/// Runs once with the winning element.
type Callback = Box<dyn FnOnce(Element) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct RaceBranch {
    condition: Condition,
    callback: Option<Callback>,
}

// ============================================================================
// RaceContext
// ============================================================================

/// Builder for racing element conditions. Created by [`Page::race`].
#[must_use = "a race does nothing until `run` is awaited"]
pub struct RaceContext {
    page: Page,
    branches: Vec<RaceBranch>,
    orphan_handle: bool,
}

impl fmt::Debug for RaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaceContext")
            .field("page", &self.page)
            .field("branches", &self.branches.len())
            .finish()
    }
}

impl Page {
    /// Starts a race builder on this page.
    pub fn race(&self) -> RaceContext {
        RaceContext {
            page: self.clone(),
            branches: Vec::new(),
            orphan_handle: false,
        }
    }
}

impl RaceContext {
    /// Adds a branch built from an arbitrary condition.
    ///
    /// The condition receives a page that fails fast with
    /// [`Error::ElementNotFound`], which counts as "no match this round".
    pub fn element_func<F, Fut>(mut self, condition: F) -> Self
    where
        F: Fn(Page) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Element>> + Send + 'static,
    {
        self.branches.push(RaceBranch {
            condition: Box::new(move |page: Page| condition(page).boxed()),
            callback: None,
        });
        self
    }

    /// Adds a branch for a selector.
    pub fn element_by(self, selector: Selector) -> Self {
        self.element_func(move |page| {
            let selector = selector.clone();
            async move { page.element_by(&selector).await }
        })
    }

    /// Adds a branch for a CSS selector.
    pub fn element(self, selector: impl Into<String>) -> Self {
        self.element_by(Selector::css(selector))
    }

    /// Adds a branch for an XPath.
    pub fn element_x(self, xpath: impl Into<String>) -> Self {
        self.element_by(Selector::xpath(xpath))
    }

    /// Adds a branch for a CSS selector with a text regex.
    pub fn element_r(self, selector: impl Into<String>, regex: impl Into<String>) -> Self {
        self.element_by(Selector::regex(selector, regex))
    }

    /// Adds a branch for a JS query function.
    pub fn element_by_js(self, opts: EvalOptions) -> Self {
        self.element_func(move |page| {
            let opts = opts.clone();
            async move { page.element_by_js(opts).await }
        })
    }

    /// Adds a branch for a full-text search.
    ///
    /// The search session is released before the branch reports.
    pub fn search(self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.element_func(move |page| {
            let query = query.clone();
            async move {
                let result = page.search(&query).await?;
                let first = result.first().cloned();
                result.release().await;
                first.ok_or(Error::ElementNotFound)
            }
        })
    }

    /// Attaches a callback to the most recently added branch.
    ///
    /// Calling this before any branch makes [`run`](Self::run) fail with
    /// [`Error::InvalidArgument`].
    pub fn handle<F, Fut>(mut self, callback: F) -> Self
    where
        F: FnOnce(Element) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        match self.branches.last_mut() {
            Some(branch) => {
                branch.callback = Some(Box::new(move |el: Element| callback(el).boxed()));
            }
            None => self.orphan_handle = true,
        }
        self
    }

    /// Runs rounds until a branch wins.
    ///
    /// The returned element polls with the page's sleeper.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `handle` was called before any branch
    /// - the first branch error that is not [`Error::ElementNotFound`]
    /// - the page sleeper's error when it gives up or the context ends
    /// - the winning callback's error
    pub async fn run(mut self) -> Result<Element> {
        if self.orphan_handle {
            return Err(Error::invalid_argument(
                "race handle registered before any branch",
            ));
        }

        debug!(page_id = %self.page.id(), branches = self.branches.len(), "Running race");

        let fast = self.page.with_sleeper(SleeperPolicy::not_found());
        let (branches, fast) = (&self.branches, &fast);

        let (index, element) =
            retry::poll(&self.page.context, &self.page.sleeper, move || async move {
                for (index, branch) in branches.iter().enumerate() {
                    match (branch.condition)(fast.clone()).await {
                        Ok(element) => return Ok(Attempt::Done((index, element))),
                        Err(Error::ElementNotFound) => continue,
                        Err(err) => return Err(err),
                    }
                }
                Ok(Attempt::Retry)
            })
            .await?;

        debug!(page_id = %self.page.id(), branch = index, "Race won");

        let element = element.with_sleeper(self.page.sleeper.clone());
        if let Some(callback) = self.branches[index].callback.take() {
            callback(element.clone()).await?;
        }
        Ok(element)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::context::Context;
    use crate::error::Error;
    use crate::protocol::{Command, DomCommand, RuntimeCommand};
    use crate::retry::SleeperPolicy;
    use crate::transport::mock::{self, MockDispatcher, Reply};

    /// Answers evaluations whose expression contains `needle` with a node,
    /// everything else with `null`.
    fn present(needle: &'static str) -> Arc<MockDispatcher> {
        MockDispatcher::new(move |command| match command {
            Command::Runtime(RuntimeCommand::Evaluate { expression, .. }) => {
                if expression.contains(needle) {
                    Reply::Ok(mock::node(needle))
                } else {
                    Reply::Ok(mock::null())
                }
            }
            _ => Reply::Ok(json!({})),
        })
    }

    #[tokio::test]
    async fn test_race_first_matching_branch_wins() {
        let dispatcher = present("#b");
        let page = mock::page(&dispatcher);
        let calls = Arc::new(AtomicUsize::new(0));
        let (a, b) = (calls.clone(), calls.clone());

        let element = page
            .race()
            .element("#a")
            .handle(move |_| async move {
                a.fetch_add(100, Ordering::SeqCst);
                Ok(())
            })
            .element("#b")
            .handle(move |_| async move {
                b.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .element("#c")
            .run()
            .await
            .expect("race");

        assert_eq!(element.object_id().as_str(), "#b");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // "#c" is never evaluated once "#b" wins.
        assert_eq!(dispatcher.count("Runtime.evaluate"), 2);
    }

    #[tokio::test]
    async fn test_race_earlier_branch_wins_ties() {
        // Both selectors match, each with its own node.
        let dispatcher = MockDispatcher::new(|command| match command {
            Command::Runtime(RuntimeCommand::Evaluate { expression, .. })
                if expression.contains("#a") =>
            {
                Reply::Ok(mock::node("node-a"))
            }
            Command::Runtime(RuntimeCommand::Evaluate { expression, .. })
                if expression.contains("#b") =>
            {
                Reply::Ok(mock::node("node-b"))
            }
            Command::Runtime(RuntimeCommand::Evaluate { .. }) => Reply::Ok(mock::null()),
            _ => Reply::Ok(json!({})),
        });
        let page = mock::page(&dispatcher);

        let a_first = page
            .race()
            .element("#a")
            .element("#b")
            .run()
            .await
            .expect("race");
        let b_first = page
            .race()
            .element("#b")
            .element("#a")
            .run()
            .await
            .expect("race");

        assert_eq!(a_first.object_id().as_str(), "node-a");
        assert_eq!(b_first.object_id().as_str(), "node-b");
        assert_eq!(dispatcher.count("Runtime.evaluate"), 2);
    }

    #[tokio::test]
    async fn test_race_polls_rounds_with_page_sleeper() {
        let rounds = AtomicUsize::new(0);
        let dispatcher = MockDispatcher::new(move |command| match command {
            Command::Runtime(RuntimeCommand::Evaluate { .. }) => {
                if rounds.fetch_add(1, Ordering::SeqCst) < 4 {
                    Reply::Ok(mock::null())
                } else {
                    Reply::Ok(mock::node("late"))
                }
            }
            _ => Reply::Ok(json!({})),
        });
        let page = mock::page(&dispatcher);

        let element = page
            .race()
            .element("#x")
            .element("#y")
            .run()
            .await
            .expect("race");
        assert_eq!(element.object_id().as_str(), "late");
        assert_eq!(element.sleeper().name(), "count");
        assert_eq!(dispatcher.count("Runtime.evaluate"), 5);
    }

    #[tokio::test]
    async fn test_race_gives_up_with_sleeper_error() {
        let dispatcher = present("#never-matches");
        let page = mock::page(&dispatcher).with_sleeper(SleeperPolicy::count(1));

        let err = page.race().element("#a").element("#b").run().await.unwrap_err();
        assert!(matches!(err, Error::MaxSleepCount { .. }));
        assert_eq!(dispatcher.count("Runtime.evaluate"), 4);
    }

    #[tokio::test]
    async fn test_race_non_not_found_error_aborts() {
        let dispatcher = MockDispatcher::new(|_| Reply::Ok(mock::primitive(json!(1))));
        let page = mock::page(&dispatcher);

        let err = page.race().element("#a").element("#b").run().await.unwrap_err();
        assert!(matches!(err, Error::ExpectElement { .. }));
        assert_eq!(dispatcher.count("Runtime.evaluate"), 1);
    }

    #[tokio::test]
    async fn test_race_callback_error_is_returned() {
        let dispatcher = present("#a");
        let page = mock::page(&dispatcher);

        let err = page
            .race()
            .element("#a")
            .handle(|_| async move { Err(Error::invalid_argument("rejected")) })
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_race_handle_before_branch_is_misuse() {
        let dispatcher = present("#a");
        let page = mock::page(&dispatcher);

        let err = page
            .race()
            .handle(|_| async move { Ok(()) })
            .element("#a")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(dispatcher.count("Runtime.evaluate"), 0);
    }

    #[tokio::test]
    async fn test_race_without_branches_waits_for_context() {
        let dispatcher = present("#a");
        let context = Context::new();
        context.cancel();
        let page = mock::page(&dispatcher)
            .with_context(context)
            .with_sleeper(SleeperPolicy::default());

        let err = page.race().run().await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_race_search_branch_releases_session() {
        let dispatcher = MockDispatcher::new(|command| match command {
            Command::Runtime(RuntimeCommand::Evaluate { .. }) => Reply::Ok(mock::null()),
            Command::Dom(DomCommand::PerformSearch { .. }) => {
                Reply::Ok(json!({"searchId": "s", "resultCount": 1}))
            }
            Command::Dom(DomCommand::GetSearchResults { .. }) => {
                Reply::Ok(json!({"nodeIds": [5]}))
            }
            Command::Dom(DomCommand::ResolveNode { .. }) => {
                Reply::Ok(json!({"object": mock::node_object("hit")}))
            }
            _ => Reply::Ok(json!({})),
        });
        let page = mock::page(&dispatcher);

        let element = page
            .race()
            .element("#absent")
            .search("Continue")
            .run()
            .await
            .expect("race");
        assert_eq!(element.object_id().as_str(), "hit");
        assert_eq!(dispatcher.count("DOM.discardSearchResults"), 1);
        assert_eq!(dispatcher.count("DOM.disable"), 1);
    }

    #[tokio::test]
    async fn test_race_element_func_and_js_branches() {
        let dispatcher = present("activeElement");
        let page = mock::page(&dispatcher);

        let element = page
            .race()
            .element_func(|_| async move { Err(Error::ElementNotFound) })
            .element_by_js(crate::EvalOptions::new(
                "function () { return document.activeElement }",
            ))
            .run()
            .await
            .expect("race");
        assert_eq!(element.object_id().as_str(), "activeElement");
    }
}
