//! The task store: sole owner and mutator of the task collection.
//!
//! Lifecycle is `Uninitialized -> Loading -> Ready`. Mutations are rejected
//! with [`TaskError::NotReady`] until [`TaskStore::load`] has run; every other
//! failure is handled here and reported to the notification sink.
//!
//! Known limitation: when a save fails after a mutation, the in-memory
//! collection keeps the mutation and durable storage lags behind until the
//! next successful save. The failure is reported with tag `operation=save`
//! and a `trigger` tag naming the mutation; no retry happens here.

use std::{collections::BTreeSet, fmt, sync::Arc};

use chrono::Utc;
use pocket_core::{
    notify::{Breadcrumb, Failure, NotificationSink, Operation},
    tasks::{normalize_text, Category, Task, TaskId},
    view::{project, TaskQuery, TaskStats},
    TaskError,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::persistence::TaskPersistence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreState::Uninitialized => "uninitialized",
            StoreState::Loading => "loading",
            StoreState::Ready => "ready",
        }
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the collection was hydrated by [`TaskStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Nothing was persisted yet.
    Fresh,
    /// Persisted tasks were restored.
    Restored { count: usize },
    /// Persisted state was unreadable; started empty and reported it.
    Recovered,
}

/// Why a mutation left the collection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    EmptyText,
    NotFound,
    NothingCompleted,
    /// An internal check failed; the failure was reported.
    Rejected,
}

/// Result of a mutation that was accepted by the lifecycle guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(TaskId),
    Applied,
    Unchanged(NoOp),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Unchanged(_))
    }
}

/// Completed tasks selected for removal, as `(index, id)` pairs.
#[derive(Debug)]
struct RemovalPlan {
    targets: Vec<(usize, TaskId)>,
}

/// In-memory authoritative task collection backed by a [`TaskPersistence`].
pub struct TaskStore<P: TaskPersistence> {
    persistence: P,
    sink: Arc<dyn NotificationSink>,
    tasks: Vec<Task>,
    state: StoreState,
}

impl<P: TaskPersistence> TaskStore<P> {
    pub fn new(persistence: P, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            persistence,
            sink,
            tasks: Vec::new(),
            state: StoreState::Uninitialized,
        }
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Current collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn view(&self, query: &TaskQuery) -> Vec<&Task> {
        project(&self.tasks, query)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.tasks)
    }

    /// Hydrate from persistence. Never fails: unreadable state is reported and
    /// replaced by an empty collection. May be called again to re-hydrate.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Hydration {
        self.state = StoreState::Loading;
        let hydration = match self.persistence.load().await {
            Ok(Some(tasks)) => {
                let count = tasks.len();
                self.tasks = tasks;
                Hydration::Restored { count }
            }
            Ok(None) => {
                self.tasks = Vec::new();
                Hydration::Fresh
            }
            Err(err) => {
                warn!(error = %err, "persisted tasks unusable, starting empty");
                self.sink.capture(Failure::new(Operation::Load, err));
                self.tasks = Vec::new();
                Hydration::Recovered
            }
        };
        self.state = StoreState::Ready;
        info!(?hydration, count = self.tasks.len(), "task store ready");
        hydration
    }

    /// Append a new incomplete task. Blank text is a no-op.
    #[instrument(skip(self, text))]
    pub async fn add(&mut self, text: &str, category: Category) -> Result<Outcome, TaskError> {
        self.ensure_ready()?;
        let Some(text) = normalize_text(text) else {
            return Ok(Outcome::Unchanged(NoOp::EmptyText));
        };

        self.sink.breadcrumb(
            Breadcrumb::new(Operation::Add, format!("Added task: {text}"))
                .with_data("category", category),
        );

        let id = self.next_id();
        let task = Task::new(id.clone(), text, category, Utc::now().timestamp_millis());
        self.tasks.push(task);
        debug!(%id, "task added");

        self.persist(Operation::Add).await;
        Ok(Outcome::Created(id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: &TaskId) -> Result<Outcome, TaskError> {
        self.ensure_ready()?;
        let Some(index) = self.position(id) else {
            debug!(%id, "delete target missing");
            return Ok(Outcome::Unchanged(NoOp::NotFound));
        };

        self.sink.breadcrumb(
            Breadcrumb::new(
                Operation::Delete,
                format!("Deleted task: {}", self.tasks[index].text),
            )
            .with_data("task_id", id),
        );
        self.tasks.remove(index);

        self.persist(Operation::Delete).await;
        Ok(Outcome::Applied)
    }

    #[instrument(skip(self))]
    pub async fn toggle_complete(&mut self, id: &TaskId) -> Result<Outcome, TaskError> {
        self.ensure_ready()?;
        let Some(index) = self.position(id) else {
            return Ok(Outcome::Unchanged(NoOp::NotFound));
        };

        let task = &mut self.tasks[index];
        self.sink.breadcrumb(
            Breadcrumb::new(
                Operation::ToggleComplete,
                format!("Toggling complete for: {}", task.text),
            )
            .with_data("task_id", id)
            .with_data("current_state", task.completed),
        );
        task.completed = !task.completed;

        self.persist(Operation::ToggleComplete).await;
        Ok(Outcome::Applied)
    }

    #[instrument(skip(self))]
    pub async fn recategorize(
        &mut self,
        id: &TaskId,
        category: Category,
    ) -> Result<Outcome, TaskError> {
        self.ensure_ready()?;
        let Some(index) = self.position(id) else {
            return Ok(Outcome::Unchanged(NoOp::NotFound));
        };

        let task = &mut self.tasks[index];
        self.sink.breadcrumb(
            Breadcrumb::new(
                Operation::Recategorize,
                format!("Updating category for: {}", task.text),
            )
            .with_data("task_id", id)
            .with_data("old_category", task.category)
            .with_data("new_category", category),
        );
        task.category = category;

        self.persist(Operation::Recategorize).await;
        Ok(Outcome::Applied)
    }

    /// Remove every completed task, keeping the relative order of the rest.
    /// A removal plan that no longer matches the collection is reported as an
    /// invariant violation and nothing is removed.
    #[instrument(skip(self))]
    pub async fn clear_completed(&mut self) -> Result<Outcome, TaskError> {
        self.ensure_ready()?;
        let stats = self.stats();
        self.sink.breadcrumb(
            Breadcrumb::new(Operation::ClearCompleted, "Attempting to clear completed tasks")
                .with_data("total", stats.total)
                .with_data("completed", stats.completed),
        );

        let plan = self.plan_removal();
        if plan.targets.is_empty() {
            return Ok(Outcome::Unchanged(NoOp::NothingCompleted));
        }
        Ok(self.remove_planned(&plan).await)
    }

    fn ensure_ready(&self) -> Result<(), TaskError> {
        match self.state {
            StoreState::Ready => Ok(()),
            other => Err(TaskError::NotReady {
                state: other.as_str(),
            }),
        }
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    fn next_id(&self) -> TaskId {
        loop {
            let candidate = TaskId::new(Uuid::new_v4().to_string());
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn plan_removal(&self) -> RemovalPlan {
        RemovalPlan {
            targets: self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.completed)
                .map(|(index, t)| (index, t.id.clone()))
                .collect(),
        }
    }

    async fn remove_planned(&mut self, plan: &RemovalPlan) -> Outcome {
        match self.apply_removal(plan) {
            Ok(removed) => {
                debug!(removed, "cleared completed tasks");
                self.persist(Operation::ClearCompleted).await;
                Outcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "clear completed aborted");
                self.sink.capture(Failure::new(Operation::ClearCompleted, err));
                Outcome::Unchanged(NoOp::Rejected)
            }
        }
    }

    // Every target is checked before anything is removed.
    fn apply_removal(&mut self, plan: &RemovalPlan) -> Result<usize, TaskError> {
        let mut doomed = BTreeSet::new();
        for (index, id) in &plan.targets {
            match self.tasks.get(*index) {
                Some(task) if &task.id == id && task.completed => {
                    doomed.insert(*index);
                }
                Some(task) => {
                    return Err(TaskError::InvariantViolation {
                        reason: format!(
                            "removal target {id} at index {index} does not match task {}",
                            task.id
                        ),
                    })
                }
                None => {
                    return Err(TaskError::InvariantViolation {
                        reason: format!(
                            "removal target {id} at index {index} is out of bounds (len {})",
                            self.tasks.len()
                        ),
                    })
                }
            }
        }

        let mut index = 0;
        self.tasks.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        Ok(doomed.len())
    }

    async fn persist(&self, trigger: Operation) {
        if let Err(err) = self.persistence.save(&self.tasks).await {
            warn!(error = %err, %trigger, "task save failed; durable copy is stale");
            self.sink
                .capture(Failure::new(Operation::Save, err).with_tag("trigger", trigger.as_tag()));
        }
    }
}
