//! Wait policies between retry attempts.
//!
//! A [`Sleeper`] is stateful (a backoff grows, a counter shrinks), so
//! every operation creates a fresh one from a cloneable
//! [`SleeperPolicy`]. The policy is the value that gets copied into pages
//! and elements; the sleeper is what a loop owns.
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | [`SleeperPolicy::backoff`] | Waits with exponential backoff until the context ends |
//! | [`SleeperPolicy::not_found`] | Fails at once with [`Error::ElementNotFound`] |
//! | [`SleeperPolicy::count`] | Allows `n` waits, then fails with [`Error::MaxSleepCount`] |
//! | [`SleeperPolicy::each`] | Runs several sleepers in order, first failure wins |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Initial backoff interval of the default policy.
pub const DEFAULT_BACKOFF_INITIAL: Duration = Duration::from_millis(100);

/// Backoff ceiling of the default policy.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(1);

// ============================================================================
// Sleeper Trait
// ============================================================================

/// Waits between two attempts of a retry loop.
///
/// Returning an error ends the loop with that error. A sleeper must fail
/// once `ctx` is cancelled or past its deadline.
#[async_trait]
pub trait Sleeper: Send {
    /// Waits before the next attempt.
    async fn sleep(&mut self, ctx: &Context) -> Result<()>;
}

// ============================================================================
// BackoffSleeper
// ============================================================================

/// Exponential backoff, doubling up to a ceiling.
#[derive(Debug, Clone)]
pub struct BackoffSleeper {
    interval: Duration,
    max: Duration,
}

impl BackoffSleeper {
    /// Creates a backoff sleeper.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            interval: initial.min(max),
            max,
        }
    }

    /// Returns the interval the next sleep will wait.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Sleeper for BackoffSleeper {
    async fn sleep(&mut self, ctx: &Context) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            () = tokio::time::sleep(self.interval) => {}
        }

        self.interval = self.interval.saturating_mul(2).min(self.max);
        Ok(())
    }
}

// ============================================================================
// NotFoundSleeper
// ============================================================================

/// Never waits; reports [`Error::ElementNotFound`] instead.
///
/// Turns a polling lookup into a single attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundSleeper;

#[async_trait]
impl Sleeper for NotFoundSleeper {
    async fn sleep(&mut self, _ctx: &Context) -> Result<()> {
        Err(Error::ElementNotFound)
    }
}

// ============================================================================
// CountSleeper
// ============================================================================

/// Allows a fixed number of waits without pausing.
#[derive(Debug, Clone)]
pub struct CountSleeper {
    max: usize,
    used: usize,
}

impl CountSleeper {
    /// Creates a sleeper that allows `max` waits.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }
}

#[async_trait]
impl Sleeper for CountSleeper {
    async fn sleep(&mut self, ctx: &Context) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        if self.used >= self.max {
            return Err(Error::MaxSleepCount { max: self.max });
        }
        self.used += 1;
        Ok(())
    }
}

// ============================================================================
// EachSleeper
// ============================================================================

/// Runs every inner sleeper in order on each wait.
pub struct EachSleeper {
    sleepers: Vec<Box<dyn Sleeper>>,
}

#[async_trait]
impl Sleeper for EachSleeper {
    async fn sleep(&mut self, ctx: &Context) -> Result<()> {
        for sleeper in &mut self.sleepers {
            sleeper.sleep(ctx).await?;
        }
        Ok(())
    }
}

// ============================================================================
// SleeperPolicy
// ============================================================================

type SleeperFactory = dyn Fn() -> Box<dyn Sleeper> + Send + Sync;

/// Cloneable recipe for creating a fresh [`Sleeper`].
#[derive(Clone)]
pub struct SleeperPolicy {
    name: &'static str,
    factory: Arc<SleeperFactory>,
}

impl fmt::Debug for SleeperPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SleeperPolicy").field(&self.name).finish()
    }
}

impl Default for SleeperPolicy {
    fn default() -> Self {
        Self::backoff(DEFAULT_BACKOFF_INITIAL, DEFAULT_BACKOFF_MAX)
    }
}

impl SleeperPolicy {
    /// Exponential backoff from `initial` up to `max`, until cancelled.
    #[must_use]
    pub fn backoff(initial: Duration, max: Duration) -> Self {
        Self {
            name: "backoff",
            factory: Arc::new(move || -> Box<dyn Sleeper> {
                Box::new(BackoffSleeper::new(initial, max))
            }),
        }
    }

    /// Fails the first wait with [`Error::ElementNotFound`].
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            name: "not_found",
            factory: Arc::new(|| -> Box<dyn Sleeper> { Box::new(NotFoundSleeper) }),
        }
    }

    /// Allows `max` immediate waits.
    #[must_use]
    pub fn count(max: usize) -> Self {
        Self {
            name: "count",
            factory: Arc::new(move || -> Box<dyn Sleeper> { Box::new(CountSleeper::new(max)) }),
        }
    }

    /// Combines policies; each wait runs all of them in order.
    ///
    /// `each([backoff, count(10)])` polls patiently but at most ten times.
    #[must_use]
    pub fn each(policies: impl IntoIterator<Item = SleeperPolicy>) -> Self {
        let policies: Vec<SleeperPolicy> = policies.into_iter().collect();
        Self {
            name: "each",
            factory: Arc::new(move || -> Box<dyn Sleeper> {
                Box::new(EachSleeper {
                    sleepers: policies.iter().map(SleeperPolicy::create).collect(),
                })
            }),
        }
    }

    /// Wraps a custom factory.
    #[must_use]
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Sleeper> + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            factory: Arc::new(factory),
        }
    }

    /// Creates a fresh sleeper.
    #[must_use]
    pub fn create(&self) -> Box<dyn Sleeper> {
        (self.factory)()
    }

    /// Returns the policy name, for diagnostics.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backoff_doubles_up_to_max() {
        let ctx = Context::new();
        let mut sleeper = BackoffSleeper::new(Duration::from_millis(1), Duration::from_millis(3));

        sleeper.sleep(&ctx).await.expect("sleep");
        assert_eq!(sleeper.interval(), Duration::from_millis(2));
        sleeper.sleep(&ctx).await.expect("sleep");
        assert_eq!(sleeper.interval(), Duration::from_millis(3));
        sleeper.sleep(&ctx).await.expect("sleep");
        assert_eq!(sleeper.interval(), Duration::from_millis(3));
    }

    #[tokio::test]
    async fn test_backoff_fails_on_cancelled_context() {
        let ctx = Context::new();
        ctx.cancel();
        let mut sleeper = BackoffSleeper::new(Duration::from_secs(60), Duration::from_secs(60));

        let err = sleeper.sleep(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_backoff_interrupted_by_deadline() {
        let ctx = Context::new().with_timeout(Duration::from_millis(10));
        let mut sleeper = BackoffSleeper::new(Duration::from_secs(60), Duration::from_secs(60));

        let err = sleeper.sleep(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_not_found_sleeper() {
        let mut sleeper = SleeperPolicy::not_found().create();
        let err = sleeper.sleep(&Context::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_count_sleeper() {
        let ctx = Context::new();
        let mut sleeper = SleeperPolicy::count(2).create();

        sleeper.sleep(&ctx).await.expect("first");
        sleeper.sleep(&ctx).await.expect("second");
        let err = sleeper.sleep(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::MaxSleepCount { max: 2 }));
    }

    #[tokio::test]
    async fn test_each_sleeper_first_failure_wins() {
        let ctx = Context::new();
        let policy = SleeperPolicy::each([
            SleeperPolicy::count(1),
            SleeperPolicy::backoff(Duration::from_millis(1), Duration::from_millis(1)),
        ]);
        let mut sleeper = policy.create();

        sleeper.sleep(&ctx).await.expect("first");
        let err = sleeper.sleep(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::MaxSleepCount { max: 1 }));
    }

    #[tokio::test]
    async fn test_policy_creates_fresh_state() {
        let ctx = Context::new();
        let policy = SleeperPolicy::count(1);

        let mut first = policy.create();
        first.sleep(&ctx).await.expect("first sleeper");
        assert!(first.sleep(&ctx).await.is_err());

        let mut second = policy.create();
        second.sleep(&ctx).await.expect("second sleeper starts over");
    }

    #[test]
    fn test_policy_debug_names() {
        assert_eq!(SleeperPolicy::default().name(), "backoff");
        assert_eq!(
            format!("{:?}", SleeperPolicy::not_found()),
            "SleeperPolicy(\"not_found\")"
        );
    }
}
