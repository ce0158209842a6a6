//! # Binding Errors
//!
//! This module defines the error types used throughout the binding framework.
//!
//! Failures are split by who produces them:
//!
//! - [`FetchError`] is what a fetch collaborator reports (network, decode, server refusal).
//! - [`ResourceError`] is what the core reports to its callers (captured failures,
//!   stale results, save conflicts).
//! - [`FlowError`] covers invalid step-flow transitions.
//!
//! A fetch failure is never thrown across the injection boundary: the binding records it
//! in its state and views render it as a first-class `Error` state.

use super::state::ResourceStatus;

/// Failure reported by a [`Fetch`](super::Fetch) or [`Store`](super::Store) operation.
///
/// The core does not classify these; any variant moves a binding to `Error`.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FetchError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Errors surfaced by bindings and editable controllers.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ResourceError {
    /// The fetch collaborator failed. Stored in the binding state on reads.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The result settled after the binding moved on (new key or teardown) and was discarded.
    #[error("Result discarded: binding moved on before it settled")]
    Stale,

    /// A save was requested while a previous save is still in flight.
    #[error("Save already in flight")]
    SaveConflict,

    /// The operation needs a `Ready` resource.
    #[error("Resource not ready ({0:?})")]
    NotReady(ResourceStatus),
}

/// Invalid transitions of a step flow.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("Flow already finished")]
    Finished,
    #[error("Already at the first step")]
    AtFirstStep,
}
