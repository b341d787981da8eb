//! Command definitions organized by domain.
//!
//! Commands follow the `Domain.methodName` format.
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `DOM` | Enable/disable, full-text search, document refresh, node resolution |
//! | `Runtime` | Evaluation, property enumeration, object release |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::{NodeId, RemoteObjectId, SearchId};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// DOM domain commands.
    Dom(DomCommand),
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
}

impl Command {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Dom(command) => command.method(),
            Self::Runtime(command) => command.method(),
        }
    }
}

impl From<DomCommand> for Command {
    fn from(command: DomCommand) -> Self {
        Self::Dom(command)
    }
}

impl From<RuntimeCommand> for Command {
    fn from(command: RuntimeCommand) -> Self {
        Self::Runtime(command)
    }
}

// ============================================================================
// DOM Commands
// ============================================================================

/// DOM domain commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DomCommand {
    /// Enable DOM agent and node tracking.
    #[serde(rename = "DOM.enable")]
    Enable,

    /// Disable DOM agent.
    #[serde(rename = "DOM.disable")]
    Disable,

    /// Start a full-text search over the document.
    #[serde(rename = "DOM.performSearch")]
    PerformSearch {
        /// Plain text, CSS selector or XPath.
        query: String,
        /// Descend into user-agent shadow trees and frames.
        #[serde(rename = "includeUserAgentShadowDOM")]
        include_user_agent_shadow_dom: bool,
    },

    /// Fetch node ids for `[fromIndex, toIndex)` of a search.
    #[serde(rename = "DOM.getSearchResults")]
    GetSearchResults {
        /// Search session.
        #[serde(rename = "searchId")]
        search_id: SearchId,
        /// First index, inclusive.
        #[serde(rename = "fromIndex")]
        from_index: usize,
        /// Last index, exclusive.
        #[serde(rename = "toIndex")]
        to_index: usize,
    },

    /// Drop a search session on the remote end.
    #[serde(rename = "DOM.discardSearchResults")]
    DiscardSearchResults {
        /// Search session.
        #[serde(rename = "searchId")]
        search_id: SearchId,
    },

    /// Return the root node, resetting remote node tracking.
    #[serde(rename = "DOM.getDocument")]
    GetDocument {
        /// Tree depth to return.
        #[serde(skip_serializing_if = "Option::is_none")]
        depth: Option<i64>,
    },

    /// Resolve a node id into a JS object.
    #[serde(rename = "DOM.resolveNode")]
    ResolveNode {
        /// Node to resolve.
        #[serde(rename = "nodeId")]
        node_id: NodeId,
    },
}

impl DomCommand {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Enable => "DOM.enable",
            Self::Disable => "DOM.disable",
            Self::PerformSearch { .. } => "DOM.performSearch",
            Self::GetSearchResults { .. } => "DOM.getSearchResults",
            Self::DiscardSearchResults { .. } => "DOM.discardSearchResults",
            Self::GetDocument { .. } => "DOM.getDocument",
            Self::ResolveNode { .. } => "DOM.resolveNode",
        }
    }
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Argument of [`RuntimeCommand::CallFunctionOn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallArgument {
    /// Primitive or JSON value.
    pub value: Value,
}

/// Runtime domain commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Evaluate an expression on the global object.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate {
        /// Expression to evaluate.
        expression: String,
        /// Return a JSON value instead of an object handle.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
        /// Await a returned promise.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
    },

    /// Call a function with `this` bound to a remote object.
    #[serde(rename = "Runtime.callFunctionOn")]
    CallFunctionOn {
        /// Function source.
        #[serde(rename = "functionDeclaration")]
        function_declaration: String,
        /// `this` binding.
        #[serde(rename = "objectId")]
        object_id: RemoteObjectId,
        /// Positional arguments.
        arguments: Vec<CallArgument>,
        /// Return a JSON value instead of an object handle.
        #[serde(rename = "returnByValue")]
        return_by_value: bool,
        /// Await a returned promise.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
    },

    /// List the properties of a remote object.
    #[serde(rename = "Runtime.getProperties")]
    GetProperties {
        /// Object to inspect.
        #[serde(rename = "objectId")]
        object_id: RemoteObjectId,
        /// Only own properties, not the prototype chain.
        #[serde(rename = "ownProperties")]
        own_properties: bool,
    },

    /// Release a remote object handle.
    #[serde(rename = "Runtime.releaseObject")]
    ReleaseObject {
        /// Object to release.
        #[serde(rename = "objectId")]
        object_id: RemoteObjectId,
    },
}

impl RuntimeCommand {
    /// Returns the protocol method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Evaluate { .. } => "Runtime.evaluate",
            Self::CallFunctionOn { .. } => "Runtime.callFunctionOn",
            Self::GetProperties { .. } => "Runtime.getProperties",
            Self::ReleaseObject { .. } => "Runtime.releaseObject",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perform_search_serialization() {
        let command = Command::from(DomCommand::PerformSearch {
            query: "Login".to_string(),
            include_user_agent_shadow_dom: true,
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "DOM.performSearch");
        assert_eq!(json["params"]["query"], "Login");
        assert_eq!(json["params"]["includeUserAgentShadowDOM"], true);
    }

    #[test]
    fn test_unit_command_has_no_params() {
        let json = serde_json::to_value(Command::from(DomCommand::Enable)).expect("serialize");
        assert_eq!(json["method"], "DOM.enable");
        assert!(json.get("params").is_none());
    }

    #[test]
    fn test_call_function_on_serialization() {
        let command = Command::from(RuntimeCommand::CallFunctionOn {
            function_declaration: "function () { return this }".to_string(),
            object_id: RemoteObjectId::new("obj-1"),
            arguments: vec![CallArgument {
                value: Value::from("#id"),
            }],
            return_by_value: false,
            await_promise: true,
        });
        let json = serde_json::to_value(&command).expect("serialize");

        assert_eq!(json["method"], "Runtime.callFunctionOn");
        assert_eq!(json["params"]["objectId"], "obj-1");
        assert_eq!(json["params"]["arguments"][0]["value"], "#id");
    }

    #[test]
    fn test_method_names_match_serialized_tag() {
        let commands: Vec<Command> = vec![
            DomCommand::Disable.into(),
            DomCommand::GetDocument { depth: Some(0) }.into(),
            DomCommand::ResolveNode {
                node_id: NodeId::new(7),
            }
            .into(),
            RuntimeCommand::ReleaseObject {
                object_id: RemoteObjectId::new("x"),
            }
            .into(),
        ];

        for command in commands {
            let json = serde_json::to_value(&command).expect("serialize");
            assert_eq!(json["method"], command.method());
        }
    }
}
