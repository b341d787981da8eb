//! Retry and polling primitives.
//!
//! Every retrying behavior in the crate is built on the two loops here:
//!
//! | Loop | Bound | Ends on |
//! |------|-------|---------|
//! | [`retry`] | `max_attempts` | `Done`, error, sleeper failure, exhaustion |
//! | [`poll`] | none | `Done`, error, sleeper failure |
//!
//! An attempt reports [`Attempt::Done`] to stop with a value,
//! [`Attempt::Retry`] to go again, or an error to stop immediately.
//! Sleeps happen only *between* attempts: a success on the first attempt
//! never sleeps, and the last attempt of [`retry`] is not followed by one.
//!
//! Exhaustion is not an error. [`retry`] reports it as
//! [`Outcome::Exhausted`] so callers decide what "nothing found" means.
//!
//! # Example
//!
//! ```ignore
//! use webdriver_query::retry::{retry, Attempt, Outcome, RetryOptions, SleeperPolicy};
//!
//! let options = RetryOptions::new(ctx, SleeperPolicy::default(), 3);
//! match retry(options, || async { Ok(Attempt::<u32>::Retry) }).await? {
//!     Outcome::Success(value) => println!("got {value}"),
//!     Outcome::Exhausted => println!("gave up"),
//! }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Wait policies.
pub mod sleeper;

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;

use tracing::trace;

use crate::context::Context;
use crate::error::Result;

pub use sleeper::{
    BackoffSleeper, CountSleeper, EachSleeper, NotFoundSleeper, Sleeper, SleeperPolicy,
};

// ============================================================================
// Types
// ============================================================================

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Stop with a value.
    Done(T),
    /// Wait one sleeper tick and try again.
    Retry,
}

/// Result of a bounded retry that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// An attempt returned [`Attempt::Done`].
    Success(T),
    /// Every attempt returned [`Attempt::Retry`].
    Exhausted,
}

impl<T> Outcome<T> {
    /// Returns the value, or `None` when exhausted.
    #[inline]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Exhausted => None,
        }
    }

    /// Returns `true` if every attempt asked for a retry.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Configuration of a bounded [`retry`].
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Context observed by the sleeper.
    pub context: Context,
    /// Policy creating the sleeper used between attempts.
    pub sleeper: SleeperPolicy,
    /// Maximum number of attempts, not sleeps.
    pub max_attempts: usize,
}

impl RetryOptions {
    /// Creates retry options.
    #[must_use]
    pub fn new(context: Context, sleeper: SleeperPolicy, max_attempts: usize) -> Self {
        Self {
            context,
            sleeper,
            max_attempts,
        }
    }
}

// ============================================================================
// Loops
// ============================================================================

/// Runs `attempt` up to `options.max_attempts` times.
///
/// With `max_attempts == 0` the function is never called and the result
/// is [`Outcome::Exhausted`].
///
/// # Errors
///
/// Returns the first error of `attempt` unchanged, or the sleeper's error
/// if a wait fails.
pub async fn retry<T, F, Fut>(options: RetryOptions, mut attempt: F) -> Result<Outcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let mut sleeper = options.sleeper.create();

    for n in 1..=options.max_attempts {
        trace!(attempt = n, max = options.max_attempts, "Retry attempt");

        if let Attempt::Done(value) = attempt().await? {
            return Ok(Outcome::Success(value));
        }
        if n < options.max_attempts {
            sleeper.sleep(&options.context).await?;
        }
    }

    Ok(Outcome::Exhausted)
}

/// Runs `attempt` until it is done, fails, or the sleeper gives up.
///
/// # Errors
///
/// Returns the first error of `attempt` unchanged, or the sleeper's error
/// if a wait fails.
pub async fn poll<T, F, Fut>(context: &Context, sleeper: &SleeperPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let mut sleeper = sleeper.create();
    let mut n: u64 = 0;

    loop {
        n += 1;
        trace!(attempt = n, "Poll attempt");

        if let Attempt::Done(value) = attempt().await? {
            return Ok(value);
        }
        sleeper.sleep(context).await?;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;

    use crate::error::Error;

    /// Sleeper that counts waits and optionally fails on the `fail_at`-th.
    struct CountingSleeper {
        waits: Arc<AtomicUsize>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&mut self, _ctx: &Context) -> Result<()> {
            let n = self.waits.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_at == Some(n) {
                return Err(Error::Cancelled);
            }
            Ok(())
        }
    }

    fn counting(fail_at: Option<usize>) -> (SleeperPolicy, Arc<AtomicUsize>) {
        let waits = Arc::new(AtomicUsize::new(0));
        let shared = Arc::clone(&waits);
        let policy = SleeperPolicy::custom(move || -> Box<dyn Sleeper> {
            Box::new(CountingSleeper {
                waits: Arc::clone(&shared),
                fail_at,
            })
        });
        (policy, waits)
    }

    proptest! {
        #[test]
        fn prop_always_retry_exhausts(max in 1usize..20) {
            let (policy, waits) = counting(None);
            let calls = AtomicUsize::new(0);
            let calls_ref = &calls;

            let outcome = tokio_test::block_on(retry(
                RetryOptions::new(Context::new(), policy, max),
                move || async move {
                    calls_ref.fetch_add(1, Ordering::SeqCst);
                    Ok(Attempt::<()>::Retry)
                },
            ))
            .expect("no error");

            prop_assert!(outcome.is_exhausted());
            prop_assert_eq!(calls.load(Ordering::SeqCst), max);
            prop_assert_eq!(waits.load(Ordering::SeqCst), max - 1);
        }

        #[test]
        fn prop_stop_at_attempt_k(max in 1usize..20, pick in 0usize..20, fail in any::<bool>()) {
            let k = pick % max + 1;
            let (policy, waits) = counting(None);
            let calls = AtomicUsize::new(0);
            let calls_ref = &calls;

            let result = tokio_test::block_on(retry(
                RetryOptions::new(Context::new(), policy, max),
                move || async move {
                    let n = calls_ref.fetch_add(1, Ordering::SeqCst) + 1;
                    match (n == k, fail) {
                        (false, _) => Ok(Attempt::Retry),
                        (true, false) => Ok(Attempt::Done(n)),
                        (true, true) => Err(Error::eval("boom")),
                    }
                },
            ));

            prop_assert_eq!(calls.load(Ordering::SeqCst), k);
            prop_assert_eq!(waits.load(Ordering::SeqCst), k - 1);
            if fail {
                let is_eval = matches!(result, Err(Error::Eval { .. }));
                prop_assert!(is_eval);
            } else {
                prop_assert_eq!(result.expect("success"), Outcome::Success(k));
            }
        }

        #[test]
        fn prop_sleeper_failure_stops(max in 2usize..20, pick in 0usize..20) {
            let j = pick % (max - 1) + 1;
            let (policy, waits) = counting(Some(j));
            let calls = AtomicUsize::new(0);
            let calls_ref = &calls;

            let result = tokio_test::block_on(retry(
                RetryOptions::new(Context::new(), policy, max),
                move || async move {
                    calls_ref.fetch_add(1, Ordering::SeqCst);
                    Ok(Attempt::<()>::Retry)
                },
            ));

            prop_assert!(matches!(result, Err(Error::Cancelled)));
            prop_assert_eq!(calls.load(Ordering::SeqCst), j);
            prop_assert_eq!(waits.load(Ordering::SeqCst), j);
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_is_exhausted() {
        let (policy, waits) = counting(None);
        let outcome = retry(RetryOptions::new(Context::new(), policy, 0), || async {
            Err::<Attempt<()>, _>(Error::eval("never called"))
        })
        .await
        .expect("no error");

        assert!(outcome.is_exhausted());
        assert_eq!(waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_attempt_error_stops_without_waiting() {
        let (policy, waits) = counting(None);
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;

        let err = retry(
            RetryOptions::new(Context::new(), policy, 5),
            move || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Err::<Attempt<()>, _>(Error::eval("boom"))
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Eval { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_poll_until_done() {
        let (policy, waits) = counting(None);
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;

        let value = poll(&Context::new(), &policy, move || async move {
            let n = calls_ref.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if n == 5 { Attempt::Done("ready") } else { Attempt::Retry })
        })
        .await
        .expect("poll");

        assert_eq!(value, "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(waits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_stops_on_cancelled_context() {
        let ctx = Context::new();
        ctx.cancel();
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;

        let err = poll(&ctx, &SleeperPolicy::default(), move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            Ok(Attempt::<()>::Retry)
        })
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_outcome_success() {
        assert_eq!(Outcome::Success(3).success(), Some(3));
        assert_eq!(Outcome::<u8>::Exhausted.success(), None);
    }
}
