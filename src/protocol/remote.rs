//! Remote values returned by evaluation.
//!
//! A [`RemoteObject`] mirrors `Runtime.RemoteObject`. Resolution only
//! cares about a handful of shapes, exposed through [`RemoteValueKind`].

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::{NodeId, RemoteObjectId, SearchId};

// ============================================================================
// RemoteObject
// ============================================================================

/// Object type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectType {
    /// Object, including `null`.
    Object,
    /// Function.
    Function,
    /// `undefined`.
    Undefined,
    /// String.
    String,
    /// Number.
    Number,
    /// Boolean.
    Boolean,
    /// Symbol.
    Symbol,
    /// BigInt.
    Bigint,
}

/// Object subtype hint, only set for `object` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectSubtype {
    /// Array.
    Array,
    /// `null`.
    Null,
    /// DOM node.
    Node,
    /// RegExp.
    Regexp,
    /// Date.
    Date,
    /// Error.
    Error,
    /// Promise.
    Promise,
    /// Anything else.
    #[serde(other)]
    Other,
}

/// Handle on, or serialized copy of, a remote JS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Type tag.
    #[serde(rename = "type")]
    pub object_type: RemoteObjectType,
    /// Subtype tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<RemoteObjectSubtype>,
    /// Constructor name, e.g. `HTMLDivElement`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Primitive value or by-value result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remote handle, absent for primitives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
}

/// Shape of a remote value as far as resolution is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteValueKind {
    /// `null`; a resolver keeps polling.
    Null,
    /// A DOM node.
    Node,
    /// An array.
    Array,
    /// Any other object.
    Object,
    /// A primitive or `undefined`.
    Primitive,
}

impl RemoteObject {
    /// Classifies the value.
    #[must_use]
    pub fn kind(&self) -> RemoteValueKind {
        match (self.object_type, self.subtype) {
            (RemoteObjectType::Object, Some(RemoteObjectSubtype::Null)) => RemoteValueKind::Null,
            (RemoteObjectType::Object, Some(RemoteObjectSubtype::Node)) => RemoteValueKind::Node,
            (RemoteObjectType::Object, Some(RemoteObjectSubtype::Array)) => RemoteValueKind::Array,
            (RemoteObjectType::Object | RemoteObjectType::Function, _) => RemoteValueKind::Object,
            _ => RemoteValueKind::Primitive,
        }
    }

    /// Returns a short description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match (&self.value, self.subtype) {
            (Some(value), _) => value.to_string(),
            (None, Some(subtype)) => format!("{:?}", subtype).to_lowercase(),
            (None, None) => format!("{:?}", self.object_type).to_lowercase(),
        }
    }
}

/// One entry of `Runtime.getProperties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,
    /// Property value, absent for accessors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RemoteObject>,
}

/// Exception raised by an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionDetails {
    /// Short exception text.
    pub text: String,
    /// Thrown value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// Returns the most descriptive message available.
    #[must_use]
    pub fn message(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|exception| exception.description.clone())
            .unwrap_or_else(|| self.text.clone())
    }
}

// ============================================================================
// Command Results
// ============================================================================

/// Result of `Runtime.evaluate` and `Runtime.callFunctionOn`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    /// Evaluation result.
    pub result: RemoteObject,
    /// Set when the script threw.
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

/// Result of `Runtime.getProperties`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPropertiesResult {
    /// Properties.
    pub result: Vec<PropertyDescriptor>,
}

/// Result of `DOM.performSearch`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSearchResult {
    /// Search session.
    pub search_id: SearchId,
    /// Number of matches.
    pub result_count: usize,
}

/// Result of `DOM.getSearchResults`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSearchResultsResult {
    /// Matching node ids.
    pub node_ids: Vec<NodeId>,
}

/// Result of `DOM.resolveNode`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveNodeResult {
    /// JS object wrapping the node.
    pub object: RemoteObject,
}

// ============================================================================
// Tests
// ============================================================================
