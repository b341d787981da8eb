//! Remote protocol message types.
//!
//! This module defines the typed requests the resolution layer sends and
//! the results it reads back. How they travel is up to the
//! [`Dispatcher`](crate::transport::Dispatcher).
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Request`] | Local → Remote | Command request |
//! | [`Response`] | Remote → Local | Command result or error |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `remote` | Remote objects and command results |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Remote values and typed command results.
pub mod remote;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{CallArgument, Command, DomCommand, RuntimeCommand};
pub use remote::{
    EvaluateResult, ExceptionDetails, GetPropertiesResult, GetSearchResultsResult,
    PerformSearchResult, PropertyDescriptor, RemoteObject, RemoteObjectSubtype, RemoteObjectType,
    RemoteValueKind, ResolveNodeResult,
};
pub use request::{Request, Response, ResponseError};
