//! Element resolution methods.

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::browser::eval::js;
use crate::browser::{Element, Elements, EvalOptions, Selector};
use crate::error::{Error, Result};
use crate::identifiers::RemoteObjectId;
use crate::protocol::{GetPropertiesResult, RemoteValueKind, RuntimeCommand};
use crate::retry::{self, Attempt, SleeperPolicy};

use super::Page;

// ============================================================================
// Trace Markers
// ============================================================================

/// On-page marker shown while a query attempt runs.
struct TraceMarker {
    object_id: RemoteObjectId,
}

impl Page {
    /// Shows a marker for `opts` when tracing is on. Failures are ignored.
    async fn show_trace(&self, opts: &EvalOptions) -> Option<TraceMarker> {
        if !self.inner.options.trace {
            return None;
        }

        let marker = Uuid::new_v4().to_string();
        let label = opts.label();
        debug!(page_id = %self.inner.id, %marker, query = %label, "Tracing query");

        let show = EvalOptions::helper("trace", js::TRACE_SHOW, vec![marker.into(), label.into()]);
        let object = self.evaluate(&show).await.ok()?;
        object.object_id.map(|object_id| TraceMarker { object_id })
    }

    /// Removes a marker. Failures are ignored.
    async fn hide_trace(&self, marker: Option<TraceMarker>) {
        let Some(marker) = marker else {
            return;
        };
        let hide = EvalOptions::helper("untrace", js::TRACE_HIDE, Vec::new())
            .with_this(marker.object_id.clone());
        let _ = self.evaluate(&hide).await;
        let _ = self.release(&marker.object_id).await;
    }
}

// ============================================================================
// Page - Single Element
// ============================================================================

impl Page {
    /// Polls a JS function until it returns a DOM node.
    ///
    /// `null` results are retried using the page's sleeper. With
    /// [`SleeperPolicy::not_found`] a single `null` yields
    /// [`Error::ElementNotFound`].
    ///
    /// # Errors
    ///
    /// - [`Error::ExpectElement`] if the function returned a non-null non-node
    /// - the sleeper's error when it gives up or the context ends
    /// - any evaluation error, unchanged
    ///
    /// # Example
    ///
    /// ```ignore
    /// let opts = EvalOptions::new("function () { return document.activeElement }");
    /// let focused = page.element_by_js(opts).await?;
    /// ```
    pub async fn element_by_js(&self, opts: EvalOptions) -> Result<Element> {
        debug!(
            page_id = %self.inner.id,
            query = %opts.label(),
            sleeper = self.sleeper.name(),
            "Resolving element"
        );

        let marker: Mutex<Option<TraceMarker>> = Mutex::new(None);
        let (page, opts_ref, marker_ref) = (self, &opts, &marker);

        let result = retry::poll(&self.context, &self.sleeper, move || async move {
            let shown = page.show_trace(opts_ref).await;
            let previous = std::mem::replace(&mut *marker_ref.lock(), shown);
            page.hide_trace(previous).await;

            let object = page.evaluate(opts_ref).await?;
            if object.kind() == RemoteValueKind::Null {
                return Ok(Attempt::Retry);
            }
            Ok(Attempt::Done(object))
        })
        .await;

        let last = marker.lock().take();
        self.hide_trace(last).await;

        let object = result?;
        if object.kind() != RemoteValueKind::Node {
            return Err(Error::expect_element(object.describe()));
        }
        self.element_from_object(object)
    }

    /// Resolves the first element matching a selector.
    pub async fn element_by(&self, selector: &Selector) -> Result<Element> {
        self.element_by_js(selector.first()).await
    }

    /// Resolves the first element matching a CSS selector.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let button = page.element("#submit").await?;
    /// ```
    pub async fn element(&self, selector: &str) -> Result<Element> {
        self.element_by(&Selector::css(selector)).await
    }

    /// Resolves the first element matching an XPath.
    pub async fn element_x(&self, xpath: &str) -> Result<Element> {
        self.element_by(&Selector::xpath(xpath)).await
    }

    /// Resolves the first element matching a CSS selector whose text matches a JS regex.
    pub async fn element_r(&self, selector: &str, regex: &str) -> Result<Element> {
        self.element_by(&Selector::regex(selector, regex)).await
    }
}

// ============================================================================
// Page - Element Lists
// ============================================================================

impl Page {
    /// Evaluates a JS function once and converts the returned array to elements.
    ///
    /// The array handle is released exactly once, whether or not the
    /// conversion succeeded. A conversion error wins over a release error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExpectElements`] if the result is not an array or
    /// contains a non-node entry.
    pub async fn elements_by_js(&self, opts: EvalOptions) -> Result<Elements> {
        debug!(page_id = %self.inner.id, query = %opts.label(), "Resolving elements");

        let object = self.evaluate(&opts).await?;
        if object.kind() != RemoteValueKind::Array {
            return Err(Error::expect_elements(object.describe()));
        }
        let Some(array_id) = object.object_id.clone() else {
            return Err(Error::expect_elements(object.describe()));
        };

        let collected = self.collect_elements(&array_id).await;
        let released = self.release(&array_id).await;

        let elements = collected?;
        released?;
        Ok(elements)
    }

    async fn collect_elements(&self, array_id: &RemoteObjectId) -> Result<Elements> {
        let properties: GetPropertiesResult = self
            .call_as(
                RuntimeCommand::GetProperties {
                    object_id: array_id.clone(),
                    own_properties: true,
                }
                .into(),
            )
            .await?;

        let mut elements = Vec::with_capacity(properties.result.len());
        for property in properties.result {
            if property.name == "__proto__" || property.name == "length" {
                continue;
            }
            let Some(value) = property.value else {
                return Err(Error::expect_elements(format!(
                    "property {} has no value",
                    property.name
                )));
            };
            if value.kind() != RemoteValueKind::Node {
                return Err(Error::expect_elements(value.describe()));
            }
            elements.push(self.element_from_object(value)?);
        }

        Ok(Elements::from(elements))
    }

    /// Resolves every element matching a selector. Never polls.
    pub async fn elements_by(&self, selector: &Selector) -> Result<Elements> {
        self.elements_by_js(selector.all()).await
    }

    /// Resolves every element matching a CSS selector.
    pub async fn elements(&self, selector: &str) -> Result<Elements> {
        self.elements_by(&Selector::css(selector)).await
    }

    /// Resolves every element matching an XPath.
    pub async fn elements_x(&self, xpath: &str) -> Result<Elements> {
        self.elements_by(&Selector::xpath(xpath)).await
    }

    /// Resolves every element matching a CSS selector whose text matches a JS regex.
    pub async fn elements_r(&self, selector: &str, regex: &str) -> Result<Elements> {
        self.elements_by(&Selector::regex(selector, regex)).await
    }
}

// ============================================================================
// Page - Presence Checks
// ============================================================================

impl Page {
    /// Looks a selector up once without polling.
    ///
    /// Returns `Ok(None)` when nothing matches. A found element polls with
    /// this page's sleeper again.
    ///
    /// # Example
    ///
    /// ```ignore
    /// if let Some(banner) = page.has(".cookie-banner").await? {
    ///     banner.element("button.accept").await?;
    /// }
    /// ```
    pub async fn has_by(&self, selector: &Selector) -> Result<Option<Element>> {
        let fast = self.with_sleeper(SleeperPolicy::not_found());
        match fast.element_by(selector).await {
            Ok(element) => Ok(Some(element.with_sleeper(self.sleeper.clone()))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Looks a CSS selector up once.
    pub async fn has(&self, selector: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::css(selector)).await
    }

    /// Looks an XPath up once.
    pub async fn has_x(&self, xpath: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::xpath(xpath)).await
    }

    /// Looks a CSS selector with a text regex up once.
    pub async fn has_r(&self, selector: &str, regex: &str) -> Result<Option<Element>> {
        self.has_by(&Selector::regex(selector, regex)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
