//! Element locator strategies.
//!
//! A [`Selector`] picks which built-in query function a convenience
//! resolver evaluates.
//!
//! # Example
//!
//! ```ignore
//! use webdriver_query::Selector;
//!
//! // CSS selector (default)
//! let btn = page.element_by(Selector::css("#submit")).await?;
//!
//! // XPath
//! let btn = page.element_by(Selector::xpath("//button[@type='submit']")).await?;
//!
//! // CSS selector filtered by a JS regex on the display text
//! let link = page.element_by(Selector::regex("a", "/sign\\s*in/i")).await?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::eval::{EvalOptions, js};

// ============================================================================
// Selector Enum
// ============================================================================

/// Element locator strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum Selector {
    /// CSS selector.
    ///
    /// # Example
    /// ```ignore
    /// Selector::css("button.primary")
    /// Selector::css("[data-testid='submit']")
    /// ```
    Css {
        /// Selector text.
        selector: String,
    },

    /// XPath expression.
    ///
    /// # Example
    /// ```ignore
    /// Selector::xpath("//div[contains(@class, 'modal')]")
    /// ```
    #[serde(rename = "xpath")]
    XPath {
        /// XPath text.
        xpath: String,
    },

    /// CSS selector whose matches are filtered by a JS regex on their text.
    ///
    /// The pattern is either a `/source/flags` literal or a bare source.
    ///
    /// # Example
    /// ```ignore
    /// Selector::regex("button", "/^submit$/i")
    /// ```
    Regex {
        /// Selector text.
        selector: String,
        /// JS regex.
        pattern: String,
    },
}

impl Selector {
    /// Creates a CSS selector.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css {
            selector: selector.into(),
        }
    }

    /// Creates an XPath selector.
    #[inline]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::XPath {
            xpath: xpath.into(),
        }
    }

    /// Creates a CSS selector with a text regex.
    #[inline]
    pub fn regex(selector: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Regex {
            selector: selector.into(),
            pattern: pattern.into(),
        }
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Css { .. } => "css",
            Self::XPath { .. } => "xpath",
            Self::Regex { .. } => "regex",
        }
    }

    /// Returns the query function resolving to the first match.
    #[must_use]
    pub fn first(&self) -> EvalOptions {
        match self {
            Self::Css { selector } => {
                EvalOptions::helper("element", js::ELEMENT, vec![Value::from(selector.as_str())])
            }
            Self::XPath { xpath } => {
                EvalOptions::helper("elementX", js::ELEMENT_X, vec![Value::from(xpath.as_str())])
            }
            Self::Regex { selector, pattern } => EvalOptions::helper(
                "elementR",
                js::ELEMENT_R,
                vec![Value::from(selector.as_str()), Value::from(pattern.as_str())],
            ),
        }
    }

    /// Returns the query function resolving to every match.
    #[must_use]
    pub fn all(&self) -> EvalOptions {
        match self {
            Self::Css { selector } => {
                EvalOptions::helper("elements", js::ELEMENTS, vec![Value::from(selector.as_str())])
            }
            Self::XPath { xpath } => EvalOptions::helper(
                "elementsX",
                js::ELEMENTS_X,
                vec![Value::from(xpath.as_str())],
            ),
            Self::Regex { selector, pattern } => EvalOptions::helper(
                "elementsR",
                js::ELEMENTS_R,
                vec![Value::from(selector.as_str()), Value::from(pattern.as_str())],
            ),
        }
    }
}

// ============================================================================
// From implementations for ergonomics
// ============================================================================

impl From<&str> for Selector {
    /// Converts a string to CSS selector (default).
    fn from(s: &str) -> Self {
        Self::css(s)
    }
}

impl From<String> for Selector {
    /// Converts a string to CSS selector (default).
    fn from(s: String) -> Self {
        Self::Css { selector: s }
    }
}

// ============================================================================
// Tests
// ============================================================================
