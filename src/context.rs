//! Cancellable context token.
//!
//! A [`Context`] carries an explicit cancel signal and an optional
//! deadline. Children observe their parent's cancellation and inherit the
//! earlier of both deadlines. Resolution loops only look at the context
//! through a [`Sleeper`](crate::retry::Sleeper), so a cancelled context
//! fails the next wait, never an in-flight remote call.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webdriver_query::Context;
//!
//! let ctx = Context::new().with_timeout(Duration::from_secs(5));
//! let button = page.with_context(ctx).element("#submit").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::Error;

// ============================================================================
// Context
// ============================================================================

struct ContextInner {
    cancelled: watch::Sender<bool>,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// Cancellation and deadline token.
///
/// Cheap to clone; clones share the same cancel signal.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline())
            .finish_non_exhaustive()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a root context that never expires on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, None)
    }

    fn build(deadline: Option<Instant>, parent: Option<Context>) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                cancelled,
                deadline,
                parent,
            }),
        }
    }

    /// Creates a child that can be cancelled independently of `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::build(None, Some(self.clone()))
    }

    /// Creates a child that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Creates a child that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self::build(Some(deadline), Some(self.clone()))
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.send_replace(true);
    }

    /// Returns `true` if this context or an ancestor was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(Context::is_cancelled)
    }

    /// Returns the effective deadline, the earliest along the chain.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        let parent = self.inner.parent.as_ref().and_then(Context::deadline);
        match (self.inner.deadline, parent) {
            (Some(own), Some(parent)) => Some(own.min(parent)),
            (own, parent) => own.or(parent),
        }
    }

    /// Returns the error a wait on this context would fail with, if any.
    #[must_use]
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// Returns the matching error.
    pub async fn done(&self) -> Error {
        if let Some(err) = self.err() {
            return err;
        }

        let mut waits: Vec<BoxFuture<'static, ()>> = Vec::new();
        let mut node = Some(self);
        while let Some(ctx) = node {
            let mut rx = ctx.inner.cancelled.subscribe();
            waits.push(
                async move {
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        future::pending::<()>().await;
                    }
                }
                .boxed(),
            );
            node = ctx.inner.parent.as_ref();
        }
        let cancelled = future::select_all(waits);

        match self.deadline() {
            Some(deadline) => tokio::select! {
                biased;
                _ = cancelled => Error::Cancelled,
                () = tokio::time::sleep_until(deadline) => Error::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                Error::Cancelled
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
