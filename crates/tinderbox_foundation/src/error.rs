//! Error types for the Tinderbox engine.
//!
//! Uses `thiserror` for ergonomic error definition.
//!
//! The taxonomy splits three ways:
//! - build-time errors ([`ErrorKind::Configuration`]) surface before any
//!   session is created;
//! - caller misuse against a live session ([`ErrorKind::UnknownHandle`],
//!   [`ErrorKind::StaleHandle`], [`ErrorKind::SessionDisposed`],
//!   [`ErrorKind::UnknownQuery`]) is recoverable and leaves the session
//!   usable;
//! - errors during firing ([`ErrorKind::ActionFailed`],
//!   [`ErrorKind::RunawayInference`]) abort the in-progress fire loop and
//!   propagate to the caller, leaving remaining pending activations and
//!   any partial fact mutations in place.

use thiserror::Error;

use crate::handle::FactHandle;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Tinderbox operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a rule-base configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    /// Creates an unknown-handle error.
    #[must_use]
    pub fn unknown_handle(handle: FactHandle) -> Self {
        Self::new(ErrorKind::UnknownHandle(handle))
    }

    /// Creates a stale-handle error.
    #[must_use]
    pub fn stale_handle(handle: FactHandle) -> Self {
        Self::new(ErrorKind::StaleHandle(handle))
    }

    /// Creates a session-disposed error.
    #[must_use]
    pub fn session_disposed() -> Self {
        Self::new(ErrorKind::SessionDisposed)
    }

    /// Creates an unknown-query error.
    #[must_use]
    pub fn unknown_query(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownQuery(name.into()))
    }

    /// Creates an action-failed error.
    #[must_use]
    pub fn action_failed(rule: impl Into<String>, source: Error) -> Self {
        Self::new(ErrorKind::ActionFailed {
            rule: rule.into(),
            source: Box::new(source),
        })
    }

    /// Creates a runaway-inference error.
    #[must_use]
    pub fn runaway_inference(limit: usize) -> Self {
        Self::new(ErrorKind::RunawayInference { limit })
    }

    /// Creates an unknown-field error.
    #[must_use]
    pub fn unknown_field(field: impl Into<String>, fact_type: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownField {
            field: field.into(),
            fact_type: fact_type.into(),
        })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed rule or query at rule-base build time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Handle does not refer to any fact in working memory.
    #[error("unknown fact handle: {0:?}")]
    UnknownHandle(FactHandle),

    /// Handle refers to a fact that was retracted (generation mismatch).
    #[error("stale fact handle: {0:?}")]
    StaleHandle(FactHandle),

    /// Operation on a session after `dispose()`.
    #[error("session has been disposed")]
    SessionDisposed,

    /// No query registered under the given name.
    #[error("unknown query: {0}")]
    UnknownQuery(String),

    /// A rule action raised during firing.
    #[error("action of rule '{rule}' failed: {source}")]
    ActionFailed {
        /// The rule whose action failed.
        rule: String,
        /// The underlying error raised by the action.
        #[source]
        source: Box<Error>,
    },

    /// Activation-count kill switch tripped during a fire loop.
    #[error("runaway inference: more than {limit} activations fired in one call")]
    RunawayInference {
        /// The configured activation limit.
        limit: usize,
    },

    /// Structural field access against a fact lacking the field.
    #[error("fact of type '{fact_type}' has no field '{field}'")]
    UnknownField {
        /// The missing field name.
        field: String,
        /// The fact's type tag.
        fact_type: String,
    },
}
