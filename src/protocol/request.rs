//! Request and Response message types.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{RequestId, SessionId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command request to the remote end.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "sessionId": "ABC",
///   "method": "DOM.performSearch",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Identifier for request/response correlation.
    pub id: RequestId,

    /// Target session, absent for browser-level calls.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a new request with auto-generated ID.
    #[inline]
    #[must_use]
    pub fn new(session_id: Option<SessionId>, command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            session_id,
            command,
        }
    }

    /// Returns the protocol method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.command.method()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Error object of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Extra detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A response from the remote end.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result data (if success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error (if error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    /// Creates a success response.
    #[inline]
    #[must_use]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    #[inline]
    #[must_use]
    pub fn error(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Extracts the result value, classifying remote errors.
    ///
    /// # Errors
    ///
    /// - [`Error::ContextNotFound`] and [`Error::SearchSessionNotFound`] for
    ///   invalidated remote state
    /// - [`Error::Protocol`] for any other remote error
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(error) => {
                let message = match error.data {
                    Some(data) => format!("{}: {}", error.message, data),
                    None => error.message,
                };
                Err(Error::from_remote(error.code, message))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::DomCommand;

    #[test]
    fn test_request_serialization() {
        let request = Request::new(
            Some(SessionId::new("S1")),
            DomCommand::DiscardSearchResults {
                search_id: "s-1".into(),
            }
            .into(),
        );
        let json = serde_json::to_value(&request).expect("serialize");

        assert_eq!(json["sessionId"], "S1");
        assert_eq!(json["method"], "DOM.discardSearchResults");
        assert_eq!(json["params"]["searchId"], "s-1");
        assert!(json["id"].is_u64());
    }

    #[test]
    fn test_request_without_session() {
        let request = Request::new(None, DomCommand::Enable.into());
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("sessionId").is_none());
        assert_eq!(request.method(), "DOM.enable");
    }

    #[test]
    fn test_success_response() {
        let response: Response =
            serde_json::from_value(json!({"id": 3, "result": {"resultCount": 2}})).expect("parse");
        assert!(response.is_success());

        let value = response.into_result().expect("success");
        assert_eq!(value["resultCount"], 2);
    }

    #[test]
    fn test_transient_error_response() {
        let response: Response = serde_json::from_value(json!({
            "id": 4,
            "error": {"code": -32000, "message": "No search session with given id found"}
        }))
        .expect("parse");

        assert!(!response.is_success());
        assert!(matches!(
            response.into_result(),
            Err(Error::SearchSessionNotFound)
        ));
    }

    #[test]
    fn test_fatal_error_response_keeps_data() {
        let response: Response = serde_json::from_value(json!({
            "id": 5,
            "error": {"code": -32602, "message": "Invalid parameters", "data": "nodeId: integer expected"}
        }))
        .expect("parse");

        match response.into_result() {
            Err(Error::Protocol { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid parameters: nodeId: integer expected");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
