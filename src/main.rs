//! wcpt: personal data export for WordCamp application records.
//!
//! Usage:
//!   wcpt import records.json
//!   wcpt export organizer@example.org
//!   wcpt export organizer@example.org --page 2

mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wcpt_config::Config;
use wcpt_privacy::{Eraser, Exporter, Registry, register_personal_data_erasers, register_personal_data_exporters};
use wcpt_store::{SqliteStore, StoreHandle};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_registry(config: &Config, store: &StoreHandle) -> Registry {
    let mut registry = Registry::new().with_max_pages(config.max_pages);
    register_personal_data_exporters(
        &mut registry,
        Exporter::new(store.clone()).with_settings(config.privacy.clone()),
    );
    if config.enable_eraser {
        register_personal_data_erasers(&mut registry, Eraser::new(store.clone()).with_settings(config.privacy.clone()));
    }
    registry
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(parent) = config.database.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Store)?;
    }
    let sqlite = SqliteStore::connect(&config.database)
        .await
        .or_raise(|| ErrorKind::Store)?
        .with_read_private(config.read_private);
    let store: StoreHandle = Arc::new(sqlite.clone());
    let registry = build_registry(&config, &store);

    let result = match cli.command {
        Command::Export { email_address, page, exporter } => {
            commands::export(&registry, &email_address, page.as_deref(), &exporter).await
        },
        Command::Erase { email_address, page, eraser } => {
            commands::erase(&registry, &email_address, &page, &eraser).await
        },
        Command::Exporters => {
            commands::list(&registry);
            Ok(())
        },
        Command::Import { file } => commands::import(&sqlite, &file).await,
    };
    sqlite.close().await;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcpt_privacy::EXPORTER_ID;
    use wcpt_store::Record;

    async fn store() -> StoreHandle {
        let sqlite = SqliteStore::connect_in_memory().await.unwrap();
        sqlite
            .upsert_record(&Record::new(1, "wordcamp").with_meta("Email Address", "a@x.com"))
            .await
            .unwrap();
        Arc::new(sqlite)
    }

    #[tokio::test]
    async fn test_registry_without_eraser() {
        let registry = build_registry(&Config::default(), &store().await);
        assert_eq!(registry.exporters().map(|(id, _)| id).collect::<Vec<_>>(), vec![EXPORTER_ID]);
        assert_eq!(registry.erasers().count(), 0);
    }

    #[tokio::test]
    async fn test_registry_with_eraser() {
        let config = Config { enable_eraser: true, ..Config::default() };
        let registry = build_registry(&config, &store().await);
        assert_eq!(registry.erasers().map(|(id, _)| id).collect::<Vec<_>>(), vec![EXPORTER_ID]);
    }

    #[tokio::test]
    async fn test_registry_exports_from_sqlite() {
        let registry = build_registry(&Config::default(), &store().await);
        let reports = registry.export_all("a@x.com").await.unwrap();
        assert_eq!(reports[0].data.len(), 1);
        assert_eq!(reports[0].data[0].value, "a@x.com");
    }
}
