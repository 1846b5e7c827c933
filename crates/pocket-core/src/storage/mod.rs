//! Durable key-value storage contract shared by every persistence backend.

mod kv_store;

pub use kv_store::{InMemoryKvStore, KvStore, KvStoreError};
