//! Error types for replay-core.
//!
//! Uses `thiserror` for structured, matchable variants. Executor failures are
//! classified into exactly three kinds; session lookups fail uniformly with
//! [`SessionError::NotFound`].

use std::time::Duration;

use thiserror::Error;

use crate::id::SessionId;

/// Classified failure of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The simulator did not finish within its time budget.
    #[error("simulator timed out after {ms} ms", ms = after.as_millis())]
    Timeout { after: Duration },

    /// The simulator exited cleanly but its output is not an ordered list of states.
    #[error("malformed simulator output: {0}")]
    MalformedOutput(String),

    /// The simulator could not be started or exited with a non-success status.
    #[error("simulator failed: {0}")]
    ExecutorFailure(String),
}

/// Failure of a `Load`. No session is registered when one is returned.
pub type LoadError = ExecutionError;

/// Errors from keyed session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The identifier was never registered or has already been deleted.
    #[error("session not found: {0}")]
    NotFound(SessionId),
}
