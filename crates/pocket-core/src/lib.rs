//! Core abstractions for Pocket: the task model, key-value storage contract,
//! failure notifications, and pure view projections over a task list.
//! Kept free of I/O so every backend and front-end can share it.

pub mod error;
pub mod notify;
pub mod storage;
pub mod tasks;
pub mod view;

pub use error::TaskError;
