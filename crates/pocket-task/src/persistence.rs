use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use pocket_core::{
    storage::{KvStore, KvStoreError},
    tasks::Task,
    TaskError,
};
use tracing::instrument;

/// Fixed key the serialized collection lives under.
pub const TASKS_KEY: &str = "todos";

/// Durable save/load of the whole task collection. Implementations are pure
/// codecs over storage and never interpret task semantics.
#[async_trait]
pub trait TaskPersistence: Send + Sync {
    /// Serialize and write the full collection, replacing what was stored.
    async fn save(&self, tasks: &[Task]) -> Result<(), TaskError>;

    /// Read the collection back. `Ok(None)` when nothing was ever saved.
    async fn load(&self) -> Result<Option<Vec<Task>>, TaskError>;
}

/// JSON codec over any `KvStore`.
pub struct KvTaskPersistence<S: KvStore> {
    store: Arc<S>,
}

impl<S: KvStore> KvTaskPersistence<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[async_trait]
impl<S: KvStore> TaskPersistence for KvTaskPersistence<S> {
    #[instrument(skip_all, fields(count = tasks.len()))]
    async fn save(&self, tasks: &[Task]) -> Result<(), TaskError> {
        let bytes = encode(tasks)?;
        self.store
            .put(TASKS_KEY, &bytes)
            .await
            .map_err(|e| TaskError::PersistenceWrite {
                reason: e.to_string(),
            })
    }

    #[instrument(skip_all)]
    async fn load(&self) -> Result<Option<Vec<Task>>, TaskError> {
        match self.store.get(TASKS_KEY).await {
            Ok(bytes) => decode(&bytes).map(Some),
            Err(KvStoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(TaskError::PersistenceRead {
                reason: err.to_string(),
            }),
        }
    }
}

/// Serialize a collection to its persisted JSON form.
pub fn encode(tasks: &[Task]) -> Result<Vec<u8>, TaskError> {
    serde_json::to_vec(tasks).map_err(|e| TaskError::PersistenceWrite {
        reason: format!("encode failed: {e}"),
    })
}

/// Parse a persisted collection. Shape errors and duplicate ids are both
/// reported as `Deserialization`.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>, TaskError> {
    let tasks: Vec<Task> =
        serde_json::from_slice(bytes).map_err(|e| TaskError::Deserialization {
            reason: e.to_string(),
        })?;

    let mut seen = HashSet::with_capacity(tasks.len());
    if let Some(dup) = tasks.iter().find(|t| !seen.insert(&t.id)) {
        return Err(TaskError::Deserialization {
            reason: format!("duplicate task id {}", dup.id),
        });
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use pocket_core::{storage::InMemoryKvStore, tasks::Category};

    use super::*;

    fn task(id: &str, text: &str, category: Category, completed: bool) -> Task {
        let mut task = Task::new(id.into(), text.into(), category, 1_700_000_000_000);
        task.completed = completed;
        task
    }

    #[tokio::test]
    async fn load_is_absent_before_first_save() {
        let persistence = KvTaskPersistence::new(InMemoryKvStore::new());
        assert_eq!(persistence.load().await.expect("load"), None);
    }

    #[tokio::test]
    async fn save_then_load_returns_same_collection() {
        let persistence = KvTaskPersistence::new(InMemoryKvStore::new());
        let tasks = vec![
            task("a", "write report", Category::Work, true),
            task("b", "call mom", Category::Personal, false),
            task("c", "eggs", Category::Shopping, false),
        ];

        persistence.save(&tasks).await.expect("save");
        assert_eq!(persistence.load().await.expect("load"), Some(tasks));
    }

    #[tokio::test]
    async fn empty_collection_round_trips_as_present() {
        let persistence = KvTaskPersistence::new(InMemoryKvStore::new());
        persistence.save(&[]).await.expect("save");
        assert_eq!(persistence.load().await.expect("load"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn writes_under_fixed_key() {
        let kv = InMemoryKvStore::new();
        let persistence = KvTaskPersistence::new(kv.clone());
        persistence
            .save(&[task("a", "t", Category::Work, false)])
            .await
            .expect("save");

        let raw = kv.get(TASKS_KEY).await.expect("raw entry");
        let text = String::from_utf8(raw).expect("utf8");
        assert!(text.contains("\"createdAt\":1700000000000"));
    }

    #[tokio::test]
    async fn garbage_is_a_deserialization_error() {
        let kv = InMemoryKvStore::new();
        kv.put(TASKS_KEY, b"{not json").await.expect("put");
        let err = KvTaskPersistence::new(kv)
            .load()
            .await
            .expect_err("should fail");
        assert!(matches!(err, TaskError::Deserialization { .. }));
    }

    #[test]
    fn decode_rejects_missing_fields_and_wrong_types() {
        let missing = br#"[{"id":"a","text":"t","completed":false,"category":"work"}]"#;
        assert!(matches!(
            decode(missing),
            Err(TaskError::Deserialization { .. })
        ));

        let wrong_type = br#"[{"id":"a","text":"t","completed":"no","category":"work","createdAt":1}]"#;
        assert!(matches!(
            decode(wrong_type),
            Err(TaskError::Deserialization { .. })
        ));
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let raw = br#"[
            {"id":"a","text":"one","completed":false,"category":"work","createdAt":1},
            {"id":"a","text":"two","completed":false,"category":"work","createdAt":2}
        ]"#;
        let err = decode(raw).expect_err("duplicate ids");
        assert!(err.to_string().contains("duplicate task id a"));
    }
}
