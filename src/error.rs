//! Error types used by the taskflow engine and tasks.
//!
//! This module defines two types:
//!
//! - [`TaskFailure`]: the single failure kind a task reports through its continuation.
//! - [`FlowError`]: misuse of the engine itself (constructing a failure without a cause,
//!   a task dropping its continuation, subscribers without a runtime).
//!
//! Both provide helper methods (`as_label`, `as_message`) for logs and event reasons.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Shared, type-erased failure cause.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// # Failure reported by a task.
///
/// Carries an arbitrary cause payload. Combinators never inspect or rewrite it; they
/// only decide whether and when to deliver it. Cloning is cheap (the cause is shared).
///
/// # Example
/// ```
/// use taskflow::TaskFailure;
///
/// let failure = TaskFailure::msg("connection refused");
/// assert_eq!(failure.to_string(), "task failed: connection refused");
/// assert_eq!(failure.as_label(), "task_failed");
/// ```
#[derive(Error, Debug, Clone)]
#[error("task failed: {cause}")]
pub struct TaskFailure {
    #[source]
    cause: Cause,
}

impl TaskFailure {
    /// Wraps a concrete error as the failure cause.
    pub fn new<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            cause: Arc::new(cause),
        }
    }

    /// Builds a failure whose cause is a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = message.into().into();
        Self {
            cause: Arc::from(boxed),
        }
    }

    /// Builds a failure from a cause that may be absent.
    ///
    /// A failure without a cause is a construction error, never a valid-looking failure.
    ///
    /// # Example
    /// ```
    /// use std::io;
    /// use taskflow::{FlowError, TaskFailure};
    ///
    /// let missing = TaskFailure::from_cause(None::<io::Error>);
    /// assert!(matches!(missing, Err(FlowError::MissingCause)));
    ///
    /// let present = TaskFailure::from_cause(Some(io::Error::other("disk full")));
    /// assert!(present.is_ok());
    /// ```
    pub fn from_cause<E>(cause: Option<E>) -> Result<Self, FlowError>
    where
        E: StdError + Send + Sync + 'static,
    {
        cause.map(Self::new).ok_or(FlowError::MissingCause)
    }

    /// Returns the underlying cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Attempts to view the cause as a concrete error type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        "task_failed"
    }

    /// Returns the cause rendered as a message, without the label prefix.
    pub fn as_message(&self) -> String {
        self.cause.to_string()
    }
}

impl From<FlowError> for TaskFailure {
    fn from(err: FlowError) -> Self {
        TaskFailure::new(err)
    }
}

/// # Errors produced by the engine itself.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A failure was constructed without a cause.
    #[error("failure constructed without a cause")]
    MissingCause,

    /// A task dropped its continuation without ever invoking it.
    #[error("task {task:?} dropped its continuation without reporting an outcome")]
    Abandoned {
        /// Name of the offending task.
        task: String,
    },

    /// Subscribers were configured but no tokio runtime was available to drive them.
    #[error("subscribers require a tokio runtime, none was provided or current")]
    NoRuntime,
}

impl FlowError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskflow::FlowError;
    ///
    /// assert_eq!(FlowError::MissingCause.as_label(), "flow_missing_cause");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::MissingCause => "flow_missing_cause",
            FlowError::Abandoned { .. } => "flow_abandoned",
            FlowError::NoRuntime => "flow_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::MissingCause => "missing cause".to_string(),
            FlowError::Abandoned { task } => format!("abandoned: {task}"),
            FlowError::NoRuntime => "no runtime".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_cause_rejects_absent_cause() {
        let err = TaskFailure::from_cause(None::<io::Error>).unwrap_err();
        assert_eq!(err, FlowError::MissingCause);
        assert_eq!(err.as_label(), "flow_missing_cause");
    }

    #[test]
    fn test_downcast_recovers_concrete_cause() {
        let failure = TaskFailure::new(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let io_err = failure.downcast_ref::<io::Error>().expect("io cause");
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        assert!(failure.downcast_ref::<FlowError>().is_none());
    }

    #[test]
    fn test_message_failure_renders_cause() {
        let failure = TaskFailure::msg("boom");
        assert_eq!(failure.as_message(), "boom");
        assert!(StdError::source(&failure).is_some());
    }

    #[test]
    fn test_clone_shares_cause() {
        let failure = TaskFailure::msg("shared");
        let copy = failure.clone();
        assert!(std::ptr::addr_eq(failure.cause(), copy.cause()));
    }
}
