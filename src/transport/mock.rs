//! Scripted in-process dispatcher for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use crate::browser::{Page, PageOptions};
use crate::error::{CONTEXT_NOT_FOUND_MESSAGE, Result, SEARCH_SESSION_NOT_FOUND_MESSAGE};
use crate::identifiers::PageId;
use crate::protocol::{Command, Request, Response};
use crate::retry::SleeperPolicy;

use super::Dispatcher;

/// What the scripted remote answers.
pub(crate) enum Reply {
    Ok(Value),
    Err(i64, String),
}

impl Reply {
    pub(crate) fn context_not_found() -> Self {
        Self::Err(-32000, CONTEXT_NOT_FOUND_MESSAGE.to_string())
    }

    pub(crate) fn search_session_not_found() -> Self {
        Self::Err(-32000, SEARCH_SESSION_NOT_FOUND_MESSAGE.to_string())
    }

    pub(crate) fn fatal(message: &str) -> Self {
        Self::Err(-32000, message.to_string())
    }
}

type Handler = dyn Fn(&Command) -> Reply + Send + Sync;

/// Records every command and answers through a handler.
pub(crate) struct MockDispatcher {
    handler: Box<Handler>,
    log: Mutex<Vec<Command>>,
}

impl MockDispatcher {
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Command) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Returns every command sent so far.
    pub(crate) fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }

    /// Returns the method names sent so far.
    pub(crate) fn methods(&self) -> Vec<&'static str> {
        self.log.lock().iter().map(Command::method).collect()
    }

    /// Counts commands with the given method name.
    pub(crate) fn count(&self, method: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|command| command.method() == method)
            .count()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn send(&self, request: Request) -> Result<Response> {
        self.log.lock().push(request.command.clone());
        Ok(match (self.handler)(&request.command) {
            Reply::Ok(value) => Response::success(request.id, value),
            Reply::Err(code, message) => Response::error(request.id, code, message),
        })
    }
}

/// Installs a test log subscriber once. Filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a page over `dispatcher` with a fast sleeper.
pub(crate) fn page(dispatcher: &Arc<MockDispatcher>) -> Page {
    init_tracing();
    let options = PageOptions::new().with_sleeper(SleeperPolicy::count(50));
    Page::with_options(PageId::new("page-1"), None, dispatcher.clone(), options)
}

/// `Runtime.evaluate` result wrapping a DOM node.
pub(crate) fn node(object_id: &str) -> Value {
    json!({
        "result": {
            "type": "object",
            "subtype": "node",
            "className": "HTMLElement",
            "description": object_id,
            "objectId": object_id,
        }
    })
}

/// `Runtime.evaluate` result for `null`.
pub(crate) fn null() -> Value {
    json!({"result": {"type": "object", "subtype": "null", "value": null}})
}

/// `Runtime.evaluate` result for a primitive.
pub(crate) fn primitive(value: Value) -> Value {
    json!({"result": {"type": "number", "value": value}})
}

/// `Runtime.evaluate` result for an array handle.
pub(crate) fn array(object_id: &str) -> Value {
    json!({
        "result": {"type": "object", "subtype": "array", "objectId": object_id, "description": "Array"}
    })
}

/// Raw remote object for a node, as found in property lists.
pub(crate) fn node_object(object_id: &str) -> Value {
    json!({"type": "object", "subtype": "node", "objectId": object_id})
}
