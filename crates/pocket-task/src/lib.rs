//! Task list state machine and its persistence adapter.

pub mod persistence;
pub mod store;

pub use persistence::{KvTaskPersistence, TaskPersistence, TASKS_KEY};
pub use store::{Hydration, NoOp, Outcome, StoreState, TaskStore};
