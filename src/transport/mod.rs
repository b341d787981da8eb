//! Call-dispatch seam.
//!
//! The resolution layer never touches a socket. It hands typed
//! [`Request`]s to a [`Dispatcher`] and gets [`Response`]s back; a
//! WebSocket client, a pipe, or an in-process fake can sit behind it.
//!
//! ```text
//! ┌──────────────────────┐   Request    ┌──────────────┐     wire     ┌─────────┐
//! │ Page / Element /     │─────────────►│  Dispatcher  │◄────────────►│ Browser │
//! │ SearchResult / Race  │◄─────────────│  (external)  │              │         │
//! └──────────────────────┘   Response   └──────────────┘              └─────────┘
//! ```
//!
//! A dispatcher reports transport failures as [`Err`], and remote errors
//! as a [`Response`] carrying an error object so they can be classified
//! by [`Response::into_result`].

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{Request, Response};

// ============================================================================
// Submodules
// ============================================================================

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Dispatcher
// ============================================================================

/// Sends one request and waits for its response.
///
/// Implementations must be safe to share between pages and tasks.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use webdriver_query::{Dispatcher, Request, Response, Result};
///
/// struct Cdp { /* connection */ }
///
/// #[async_trait]
/// impl Dispatcher for Cdp {
///     async fn send(&self, request: Request) -> Result<Response> {
///         let raw = self.roundtrip(serde_json::to_string(&request)?).await?;
///         Ok(serde_json::from_str(&raw)?)
///     }
/// }
/// ```
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Sends `request` and returns the matching response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](crate::Error::Connection) or another
    /// transport error if the request could not be delivered.
    async fn send(&self, request: Request) -> Result<Response>;
}
