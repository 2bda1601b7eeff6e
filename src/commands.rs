//! Subcommand implementations.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use std::path::Path;
use wcpt_privacy::{Registry, coerce_page};
use wcpt_store::{Record, SqliteStore};

fn print_json(value: &impl Serialize) -> Result<()> {
    let stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(stdout, value).or_raise(|| ErrorKind::Output)?;
    println!();
    Ok(())
}

pub async fn export(registry: &Registry, email_address: &str, page: Option<&str>, exporter: &str) -> Result<()> {
    match page {
        Some(page) => {
            let page = registry
                .export_page(exporter, email_address, coerce_page(page))
                .await
                .or_raise(|| ErrorKind::Export)?;
            print_json(&page)
        },
        None => {
            let reports = registry.export_all(email_address).await.or_raise(|| ErrorKind::Export)?;
            print_json(&reports)
        },
    }
}

pub async fn erase(registry: &Registry, email_address: &str, page: &str, eraser: &str) -> Result<()> {
    if registry.erasers().next().is_none() {
        exn::bail!(ErrorKind::EraserDisabled);
    }
    let page = registry
        .erase_page(eraser, email_address, coerce_page(page))
        .await
        .or_raise(|| ErrorKind::Erase)?;
    print_json(&page)
}

pub fn list(registry: &Registry) {
    for (id, registration) in registry.exporters() {
        println!("exporter\t{id}\t{}", registration.friendly_name);
    }
    for (id, registration) in registry.erasers() {
        println!("eraser\t{id}\t{}", registration.friendly_name);
    }
}

/// Parse a JSON array of records.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<Record>> {
    serde_json::from_str(json)
}

pub async fn import(store: &SqliteStore, file: &Path) -> Result<()> {
    let json = tokio::fs::read_to_string(file).await.or_raise(|| ErrorKind::Input(file.to_path_buf()))?;
    let records = parse_records(&json).or_raise(|| ErrorKind::Input(file.to_path_buf()))?;
    for record in &records {
        store.upsert_record(record).await.or_raise(|| ErrorKind::Store)?;
    }
    tracing::info!(records = records.len(), file = %file.display(), "Imported records");
    Ok(())
}
