use std::{path::PathBuf, sync::Arc};

use color_eyre::Result;
use dirs::data_dir;
use pocket_core::notify::{NotificationSink, TracingSink};
use pocket_storage::file_store::FileStore;
use pocket_task::{KvTaskPersistence, TaskStore};
use tracing::debug;

use crate::config::Config;

pub type CliTaskStore = TaskStore<KvTaskPersistence<FileStore>>;

/// Resolve the default data directory for Pocket.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("pocket"))
}

/// Build the file store, honouring a `data_dir` override.
pub fn store_from_config(config: &Config) -> Result<FileStore> {
    let root = match &config.data_dir {
        Some(root) => root.clone(),
        None => default_data_dir()?,
    };
    debug!(?root, "initializing file store");
    Ok(FileStore::new(root))
}

/// Build and hydrate the task store the CLI operates on.
pub async fn open_task_store(config: &Config) -> Result<CliTaskStore> {
    let sink: Arc<dyn NotificationSink> = Arc::new(TracingSink);
    let mut store = TaskStore::new(KvTaskPersistence::new(store_from_config(config)?), sink);
    store.load().await;
    Ok(store)
}
