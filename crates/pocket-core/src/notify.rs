//! Notification sink contract: structured failure events and breadcrumbs
//! emitted by the task store for observability.
//!
//! Sinks never influence store correctness. A sink that drops everything is
//! a valid implementation.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, error};

use crate::error::TaskError;

/// Store operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Save,
    Add,
    Delete,
    ToggleComplete,
    Recategorize,
    ClearCompleted,
}

impl Operation {
    /// Tag value used in notification events.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Save => "save",
            Operation::Add => "add",
            Operation::Delete => "delete",
            Operation::ToggleComplete => "toggle-complete",
            Operation::Recategorize => "recategorize",
            Operation::ClearCompleted => "clear-completed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A failure reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub operation: Operation,
    pub error: TaskError,
    /// Always carries `operation` and `condition`; callers may add more.
    pub tags: BTreeMap<String, String>,
}

impl Failure {
    pub fn new(operation: Operation, error: TaskError) -> Self {
        let tags = BTreeMap::from([
            ("operation".to_string(), operation.as_tag().to_string()),
            ("condition".to_string(), error.kind().to_string()),
        ]);
        Self {
            operation,
            error,
            tags,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Info-level trail entry recorded before a mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub operation: Operation,
    pub message: String,
    pub data: BTreeMap<String, String>,
}

impl Breadcrumb {
    pub fn new(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }
}

/// Receives failure events (and optionally breadcrumbs) from the store.
pub trait NotificationSink: Send + Sync {
    /// Report a failure. Must not panic.
    fn capture(&self, failure: Failure);

    /// Record a diagnostic breadcrumb. Ignored unless overridden.
    fn breadcrumb(&self, _crumb: Breadcrumb) {}
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn capture(&self, failure: Failure) {
        error!(
            operation = failure.operation.as_tag(),
            condition = failure.error.kind(),
            tags = ?failure.tags,
            "{}",
            failure.error
        );
    }

    fn breadcrumb(&self, crumb: Breadcrumb) {
        debug!(operation = crumb.operation.as_tag(), data = ?crumb.data, "{}", crumb.message);
    }
}

/// Sink that keeps every event in memory; clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    failures: Arc<Mutex<Vec<Failure>>>,
    breadcrumbs: Arc<Mutex<Vec<Breadcrumb>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<Failure> {
        lock(&self.failures).clone()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        lock(&self.breadcrumbs).clone()
    }
}

impl NotificationSink for RecordingSink {
    fn capture(&self, failure: Failure) {
        lock(&self.failures).push(failure);
    }

    fn breadcrumb(&self, crumb: Breadcrumb) {
        lock(&self.breadcrumbs).push(crumb);
    }
}

// A poisoned log is still a usable log.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_operation_and_condition_tags() {
        let failure = Failure::new(
            Operation::Save,
            TaskError::PersistenceWrite {
                reason: "disk full".into(),
            },
        )
        .with_tag("trigger", "add");

        assert_eq!(failure.tags.get("operation").map(String::as_str), Some("save"));
        assert_eq!(
            failure.tags.get("condition").map(String::as_str),
            Some("persistence-write")
        );
        assert_eq!(failure.tags.get("trigger").map(String::as_str), Some("add"));
    }

    #[test]
    fn recording_sink_clones_share_log() {
        let sink = RecordingSink::new();
        let handle = sink.clone();
        sink.capture(Failure::new(
            Operation::Load,
            TaskError::Deserialization {
                reason: "bad json".into(),
            },
        ));
        sink.breadcrumb(Breadcrumb::new(Operation::Add, "Added task").with_data("category", "work"));

        assert_eq!(handle.failures().len(), 1);
        let crumbs = handle.breadcrumbs();
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].data.get("category").map(String::as_str), Some("work"));
    }

    #[test]
    fn tracing_sink_accepts_events_without_subscriber() {
        let sink = TracingSink;
        sink.capture(Failure::new(
            Operation::ClearCompleted,
            TaskError::InvariantViolation {
                reason: "stale plan".into(),
            },
        ));
        sink.breadcrumb(Breadcrumb::new(Operation::Delete, "Deleted task"));
    }

    #[test]
    fn operation_tags_match_display() {
        assert_eq!(Operation::ClearCompleted.to_string(), "clear-completed");
        assert_eq!(Operation::ToggleComplete.as_tag(), "toggle-complete");
    }
}
