use thiserror::Error;

use crate::tasks::TaskId;

/// Failure conditions raised while operating on the task list.
///
/// Only [`TaskError::NotReady`] is ever returned to store callers; the rest
/// are handled inside the store and reported to the notification sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Invalid input to an operation (e.g. an unknown category).
    #[error("validation failed: {reason}")]
    Validation { reason: String },
    /// Operation targeted an id that is not in the collection.
    #[error("task not found: {id}")]
    NotFound { id: TaskId },
    /// Durable write failed; the in-memory state is ahead of storage.
    #[error("failed to persist tasks: {reason}")]
    PersistenceWrite { reason: String },
    /// Backing store could not be read.
    #[error("failed to read persisted tasks: {reason}")]
    PersistenceRead { reason: String },
    /// Stored bytes are not a valid task collection.
    #[error("persisted tasks are corrupt: {reason}")]
    Deserialization { reason: String },
    /// An internal precondition did not hold during a mutation.
    #[error("internal invariant violated: {reason}")]
    InvariantViolation { reason: String },
    /// Mutation attempted before the store finished loading.
    #[error("task store is not ready (state: {state})")]
    NotReady { state: &'static str },
}

impl TaskError {
    /// Stable condition name used as a notification tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Validation { .. } => "validation",
            TaskError::NotFound { .. } => "not-found",
            TaskError::PersistenceWrite { .. } => "persistence-write",
            TaskError::PersistenceRead { .. } => "persistence-read",
            TaskError::Deserialization { .. } => "deserialization",
            TaskError::InvariantViolation { .. } => "invariant-violation",
            TaskError::NotReady { .. } => "not-ready",
        }
    }
}
