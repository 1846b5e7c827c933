//! Concrete storage backends for Pocket.

pub mod file_store;
