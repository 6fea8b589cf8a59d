//! Error types for graph exploration operations.

use thiserror::Error;

/// Result type alias for cinegraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the graph engine and the fetch orchestrator.
///
/// None of these are fatal: a failed expansion leaves the graph exactly as it
/// was before the click, and the error is returned as a value so a UI layer
/// can decide whether to show feedback.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A knowledge-base lookup failed (network error, bad response, ...)
    #[error("entity lookup failed: {0}")]
    Lookup(String),

    /// Identifier resolution returned no match for a display name
    #[error("no entity identifier found for '{0}'")]
    ResolutionMiss(String),

    /// Node not found in graph
    #[error("node '{0}' not found in graph")]
    NodeNotFound(String),

    /// Response deserialization error
    #[error("response deserialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a lookup error from any displayable cause
    pub fn lookup<S: Into<String>>(msg: S) -> Self {
        Self::Lookup(msg.into())
    }

    /// Returns true if this error means "no data", as opposed to a
    /// transport/service failure worth retrying.
    #[must_use]
    pub fn is_resolution_miss(&self) -> bool {
        matches!(self, Error::ResolutionMiss(_))
    }
}
