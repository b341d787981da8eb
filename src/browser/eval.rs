//! Remote evaluation options and built-in query functions.
//!
//! Every query is a JS function evaluated remotely, either on the global
//! object or with `this` bound to an element. The functions below treat a
//! `this` that is a DOM node as the search root and fall back to
//! `document` otherwise.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::identifiers::RemoteObjectId;

// ============================================================================
// Query Functions
// ============================================================================

/// Remote query function sources.
pub(crate) mod js {
    /// First node matching a CSS selector.
    pub const ELEMENT: &str = r#"function (selector) {
  const root = this instanceof Node ? this : document;
  return root.querySelector(selector);
}"#;

    /// First node matching an XPath.
    pub const ELEMENT_X: &str = r#"function (xpath) {
  const root = this instanceof Node ? this : document;
  return document.evaluate(xpath, root, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
}"#;

    /// First node matching a CSS selector whose text matches a JS regex.
    ///
    /// `/pattern/flags` literals keep their flags, anything else is a plain pattern.
    pub const ELEMENT_R: &str = r#"function (selector, regex) {
  const root = this instanceof Node ? this : document;
  const literal = /^\/(.*)\/([a-z]*)$/s.exec(regex);
  const re = literal ? new RegExp(literal[1], literal[2]) : new RegExp(regex);
  for (const el of root.querySelectorAll(selector)) {
    const text = el.innerText !== undefined ? el.innerText : el.textContent;
    if (re.test(text || el.placeholder || '')) return el;
  }
  return null;
}"#;

    /// All nodes matching a CSS selector.
    pub const ELEMENTS: &str = r#"function (selector) {
  const root = this instanceof Node ? this : document;
  return Array.from(root.querySelectorAll(selector));
}"#;

    /// All nodes matching an XPath.
    pub const ELEMENTS_X: &str = r#"function (xpath) {
  const root = this instanceof Node ? this : document;
  const iter = document.evaluate(xpath, root, null, XPathResult.ORDERED_NODE_ITERATOR_TYPE, null);
  const list = [];
  for (let el = iter.iterateNext(); el; el = iter.iterateNext()) list.push(el);
  return list;
}"#;

    /// All nodes matching a CSS selector whose text matches a JS regex.
    pub const ELEMENTS_R: &str = r#"function (selector, regex) {
  const root = this instanceof Node ? this : document;
  const literal = /^\/(.*)\/([a-z]*)$/s.exec(regex);
  const re = literal ? new RegExp(literal[1], literal[2]) : new RegExp(regex);
  return Array.from(root.querySelectorAll(selector)).filter((el) => {
    const text = el.innerText !== undefined ? el.innerText : el.textContent;
    return re.test(text || el.placeholder || '');
  });
}"#;

    /// Ancestors of `this` matching a CSS selector, nearest first.
    pub const PARENTS: &str = r#"function (selector) {
  const list = [];
  for (let el = this.parentElement; el; el = el.parentElement) {
    if (el.matches(selector)) list.push(el);
  }
  return list;
}"#;

    /// Parent element of `this`.
    pub const PARENT: &str = "function () { return this.parentElement }";

    /// Next sibling element of `this`.
    pub const NEXT: &str = "function () { return this.nextElementSibling }";

    /// Previous sibling element of `this`.
    pub const PREVIOUS: &str = "function () { return this.previousElementSibling }";

    /// Adds a visible marker naming the running query; returns the marker.
    pub const TRACE_SHOW: &str = r#"function (id, label) {
  const el = document.createElement('div');
  el.setAttribute('data-query-trace', id);
  el.textContent = label;
  el.style.cssText = 'position:fixed;z-index:2147483647;right:0;bottom:0;' +
    'padding:2px 6px;font:12px monospace;color:#fff;background:rgba(0,0,0,.7);pointer-events:none';
  (document.body || document.documentElement).appendChild(el);
  return el;
}"#;

    /// Removes a marker created by [`TRACE_SHOW`].
    pub const TRACE_HIDE: &str = "function () { this.remove() }";

    /// Current page URL.
    pub const LOCATION_HREF: &str = "function () { return location.href }";
}

// ============================================================================
// EvalOptions
// ============================================================================

/// A remote function call: source, arguments and optional `this`.
///
/// # Example
///
/// ```ignore
/// use webdriver_query::EvalOptions;
///
/// let opts = EvalOptions::new("function (id) { return document.getElementById(id) }")
///     .with_arg("main");
/// let main = page.element_by_js(opts).await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOptions {
    /// JS function source.
    pub js: String,

    /// Positional JSON arguments.
    pub args: Vec<Value>,

    /// `this` binding; the global object when `None`.
    pub this: Option<RemoteObjectId>,

    /// Return a JSON value instead of a remote handle.
    pub by_value: bool,

    /// Short name used in logs and trace markers.
    pub name: Option<&'static str>,
}

impl EvalOptions {
    /// Creates options for a JS function.
    #[must_use]
    pub fn new(js: impl Into<String>) -> Self {
        Self {
            js: js.into(),
            args: Vec::new(),
            this: None,
            by_value: false,
            name: None,
        }
    }

    /// Builds options for a built-in query function.
    pub(crate) fn helper(name: &'static str, js: &'static str, args: Vec<Value>) -> Self {
        Self {
            js: js.to_string(),
            args,
            this: None,
            by_value: false,
            name: Some(name),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replaces all arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Binds `this` to a remote object.
    #[must_use]
    pub fn with_this(mut self, object_id: RemoteObjectId) -> Self {
        self.this = Some(object_id);
        self
    }

    /// Requests a JSON value instead of a remote handle.
    #[must_use]
    pub fn by_value(mut self) -> Self {
        self.by_value = true;
        self
    }

    /// Returns a label for logs and trace markers.
    #[must_use]
    pub fn label(&self) -> String {
        let name = self.name.unwrap_or("js");
        let args: Vec<String> = self.args.iter().map(Value::to_string).collect();
        format!("{}({})", name, args.join(", "))
    }

    /// Renders a global-object evaluation of the function.
    pub(crate) fn expression(&self) -> String {
        let args = Value::Array(self.args.clone());
        format!("({}).apply(globalThis, {})", self.js, args)
    }
}

// ============================================================================
// Tests
// ============================================================================
