//! Core Page struct, accessors and remote plumbing.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::browser::{Element, EvalOptions, PageOptions};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::identifiers::{NodeId, PageId, RemoteObjectId, SessionId};
use crate::protocol::{
    CallArgument, Command, DomCommand, EvaluateResult, RemoteObject, Request, ResolveNodeResult,
    RuntimeCommand,
};
use crate::retry::SleeperPolicy;
use crate::transport::Dispatcher;

// ============================================================================
// Types
// ============================================================================

/// Protocol domain whose enablement is tracked per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `DOM`, required for full-text search.
    Dom,
}

impl Domain {
    fn enable(self) -> Command {
        match self {
            Self::Dom => DomCommand::Enable.into(),
        }
    }

    fn disable(self) -> Command {
        match self {
            Self::Dom => DomCommand::Disable.into(),
        }
    }
}

/// Restores a domain to the state it had before [`Page::enable_domain`].
///
/// Only the guard that actually enabled the domain disables it again.
#[derive(Debug)]
#[must_use = "call `restore` to disable the domain again"]
pub struct DomainGuard {
    domain: Domain,
    enabled_here: bool,
}

impl DomainGuard {
    /// Returns `true` if this guard enabled the domain.
    #[inline]
    #[must_use]
    pub fn enabled_here(&self) -> bool {
        self.enabled_here
    }

    /// Disables the domain if this guard enabled it. Errors are ignored.
    pub async fn restore(self, page: &Page) {
        if !self.enabled_here {
            return;
        }
        page.inner.domains.lock().remove(&self.domain);
        let _ = page.call(self.domain.disable()).await;
    }
}

/// Internal shared state for a page.
pub(crate) struct PageInner {
    /// Target ID.
    pub id: PageId,
    /// Session ID, if attached through a flat session.
    pub session_id: Option<SessionId>,
    /// Call-dispatch surface.
    pub dispatcher: Arc<dyn Dispatcher>,
    /// Resolution defaults.
    pub options: PageOptions,
    /// Domains currently enabled on the remote end.
    pub domains: Mutex<FxHashSet<Domain>>,
}

// ============================================================================
// Page
// ============================================================================

/// A handle to a remote document.
///
/// Cloning is cheap. A clone may carry its own [`Context`] and
/// [`SleeperPolicy`] while sharing the connection and domain state.
#[derive(Clone)]
pub struct Page {
    pub(crate) inner: Arc<PageInner>,
    pub(crate) context: Context,
    pub(crate) sleeper: SleeperPolicy,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.inner.id)
            .field("session_id", &self.inner.session_id)
            .field("sleeper", &self.sleeper)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Creates a page handle with default options.
    pub fn new(id: PageId, session_id: Option<SessionId>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_options(id, session_id, dispatcher, PageOptions::default())
    }

    /// Creates a page handle with custom options.
    pub fn with_options(
        id: PageId,
        session_id: Option<SessionId>,
        dispatcher: Arc<dyn Dispatcher>,
        options: PageOptions,
    ) -> Self {
        let sleeper = options.sleeper.clone();
        Self {
            inner: Arc::new(PageInner {
                id,
                session_id,
                dispatcher,
                options,
                domains: Mutex::new(FxHashSet::default()),
            }),
            context: Context::new(),
            sleeper,
        }
    }
}

// ============================================================================
// Page - Accessors
// ============================================================================

impl Page {
    /// Returns the page ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PageId {
        &self.inner.id
    }

    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.inner.session_id.as_ref()
    }

    /// Returns the options the page was created with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &PageOptions {
        &self.inner.options
    }

    /// Returns the context observed by polling loops.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the sleeper policy used by polling loops.
    #[inline]
    #[must_use]
    pub fn sleeper(&self) -> &SleeperPolicy {
        &self.sleeper
    }

    /// Returns a clone observing `context`.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Returns a clone whose context expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_context(self.context.with_timeout(timeout))
    }

    /// Returns a clone polling with `sleeper`.
    ///
    /// Use [`SleeperPolicy::not_found`] for a single attempt.
    #[must_use]
    pub fn with_sleeper(&self, sleeper: SleeperPolicy) -> Self {
        Self {
            sleeper,
            ..self.clone()
        }
    }
}

// ============================================================================
// Page - Remote Calls
// ============================================================================

impl Page {
    /// Sends a command and returns its raw result.
    pub(crate) async fn call(&self, command: Command) -> Result<Value> {
        let request = Request::new(self.inner.session_id.clone(), command);
        self.inner.dispatcher.send(request).await?.into_result()
    }

    /// Sends a command and deserializes its result.
    pub(crate) async fn call_as<T: DeserializeOwned>(&self, command: Command) -> Result<T> {
        let value = self.call(command).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Enables a domain unless it is already enabled on this page.
    ///
    /// # Errors
    ///
    /// Returns the remote error if enabling fails.
    pub async fn enable_domain(&self, domain: Domain) -> Result<DomainGuard> {
        // Claimed before the call so concurrent clones enable it once.
        if !self.inner.domains.lock().insert(domain) {
            return Ok(DomainGuard {
                domain,
                enabled_here: false,
            });
        }

        debug!(page_id = %self.inner.id, ?domain, "Enabling domain");
        if let Err(err) = self.call(domain.enable()).await {
            self.inner.domains.lock().remove(&domain);
            return Err(err);
        }

        Ok(DomainGuard {
            domain,
            enabled_here: true,
        })
    }

    /// Evaluates a function remotely and returns the raw result.
    ///
    /// # Errors
    ///
    /// - [`Error::Eval`] if the function threw
    /// - any remote or transport error
    pub async fn evaluate(&self, opts: &EvalOptions) -> Result<RemoteObject> {
        let command = match &opts.this {
            None => RuntimeCommand::Evaluate {
                expression: opts.expression(),
                return_by_value: opts.by_value,
                await_promise: true,
            },
            Some(object_id) => RuntimeCommand::CallFunctionOn {
                function_declaration: opts.js.clone(),
                object_id: object_id.clone(),
                arguments: opts
                    .args
                    .iter()
                    .cloned()
                    .map(|value| CallArgument { value })
                    .collect(),
                return_by_value: opts.by_value,
                await_promise: true,
            },
        };

        let result: EvaluateResult = self.call_as(command.into()).await?;
        if let Some(details) = result.exception_details {
            return Err(Error::eval(details.message()));
        }
        Ok(result.result)
    }

    /// Evaluates a function on the global object and returns its JSON value.
    pub async fn eval_value(&self, js: &str) -> Result<Value> {
        let object = self.evaluate(&EvalOptions::new(js).by_value()).await?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    /// Releases a remote object handle.
    pub async fn release(&self, object_id: &RemoteObjectId) -> Result<()> {
        self.call(
            RuntimeCommand::ReleaseObject {
                object_id: object_id.clone(),
            }
            .into(),
        )
        .await?;
        Ok(())
    }

    /// Wraps a remote node object as an [`Element`] of this page.
    ///
    /// The element inherits this page's context and sleeper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExpectElement`] if the object has no remote handle.
    pub fn element_from_object(&self, object: RemoteObject) -> Result<Element> {
        match object.object_id.clone() {
            Some(object_id) => Ok(Element::new(object_id, object, self.clone())),
            None => Err(Error::expect_element(object.describe())),
        }
    }

    /// Resolves a DOM node id into an [`Element`].
    pub async fn element_from_node(&self, node_id: NodeId) -> Result<Element> {
        let resolved: ResolveNodeResult = self
            .call_as(DomCommand::ResolveNode { node_id }.into())
            .await?;
        self.element_from_object(resolved.object)
    }
}

// ============================================================================
// Tests
// ============================================================================
