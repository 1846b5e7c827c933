mod cli;
mod config;
mod storage;
mod tasks;

use crate::cli::{ConfigCommand, TaskCommand};
use clap::Parser;
use color_eyre::Result;
use pocket_core::storage::KvStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the task store.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command.unwrap_or(cli::Command::Task(TaskCommand::list_all())) {
        cli::Command::Task(cmd) => {
            let mut store = storage::open_task_store(&config).await?;
            let mut stdout = std::io::stdout().lock();
            tasks::handle(cmd, &mut store, &config, &mut stdout).await?
        }
        cli::Command::Version => print_version(),
        cli::Command::Health => run_health_check(&config).await?,
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("pocket {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick health check of the configured storage path.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: KvStore>(store: &S) -> Result<()> {
    let probe_key = "health/probe";
    let payload = b"ok";
    store.put(probe_key, payload).await?;
    let round_trip = store.get(probe_key).await?;
    store.delete(probe_key).await?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use pocket_core::storage::InMemoryKvStore;
    use pocket_storage::file_store::FileStore;

    use super::*;

    #[tokio::test]
    async fn health_check_with_file_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        run_store_health(&store)
            .await
            .expect("health check should succeed");
        assert!(store.get("health/probe").await.is_err(), "probe cleaned up");
    }

    #[tokio::test]
    async fn health_check_with_memory_store_succeeds() {
        run_store_health(&InMemoryKvStore::new())
            .await
            .expect("health check should succeed");
    }

    #[tokio::test]
    async fn health_check_reports_unwritable_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").expect("write");
        let store = FileStore::new(&blocker);
        assert!(run_store_health(&store).await.is_err());
    }
}
