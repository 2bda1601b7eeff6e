//! Personal data export.
//!
//! One call exports one page: fetch the candidate records for the page, then
//! validate every catalog field of every candidate against the address.

use crate::catalog::{FieldCatalog, FieldDefinition};
use crate::error::{ErrorKind, Result};
use crate::page::is_done;
use crate::query::fetch_records;
use crate::settings::Settings;
use exn::ResultExt;
use tracing::instrument;
use wcpt_store::{RecordId, RecordStore, StoreHandle};

/// A single exported field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    pub name: String,
    pub value: String,
}
impl MatchResult {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// One page of exported data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportPage {
    pub data: Vec<MatchResult>,
    /// No further pages exist. Final pages may still carry data.
    pub done: bool,
}

/// Exports the catalog fields of application records that hold an address.
///
/// Stateless between calls: every page is re-derived from the address and
/// the page number alone.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wcpt_privacy::Exporter;
/// use wcpt_store::{SqliteStore, StoreHandle};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store: StoreHandle = Arc::new(SqliteStore::connect_in_memory().await?);
/// let exporter = Exporter::new(store);
/// let page = exporter.export("nobody@example.org", 1).await?;
/// assert!(page.data.is_empty());
/// assert!(page.done);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Exporter {
    store: StoreHandle,
    catalog: FieldCatalog,
    settings: Settings,
}

impl Exporter {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            catalog: FieldCatalog::default(),
            settings: Settings::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: FieldCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Export one page of fields matching `email_address`.
    ///
    /// The address is compared byte-for-byte; a field whose value merely
    /// contains it is not exported. Store failures are raised as
    /// [`ErrorKind::Store`] and nothing from the page is returned.
    #[instrument(skip(self, email_address), fields(store = self.store.name()))]
    pub async fn export(&self, email_address: &str, page: u32) -> Result<ExportPage> {
        let result = fetch_records(&*self.store, &self.catalog, &self.settings, email_address, page).await?;
        let mut data = Vec::new();
        for id in result.records {
            data.extend(self.record_matches(id, email_address).await?);
        }
        let done = is_done(page, result.max_num_pages);
        tracing::debug!(matches = data.len(), done, "Exported page");
        Ok(ExportPage { data, done })
    }

    /// Every matching catalog field of one record, with its associated fields.
    async fn record_matches(&self, id: RecordId, email_address: &str) -> Result<Vec<MatchResult>> {
        let mut matches = Vec::new();
        for field in self.catalog.fields() {
            matches.extend(field_matches(&*self.store, id, field, email_address).await?);
        }
        if matches.is_empty() {
            tracing::trace!(record = %id, "Candidate record has no exact matches");
        }
        Ok(matches)
    }
}

async fn field_matches(
    store: &dyn RecordStore,
    id: RecordId,
    field: &FieldDefinition,
    email_address: &str,
) -> Result<Vec<MatchResult>> {
    let value = store.get_meta(id, field.primary).await.or_raise(|| ErrorKind::Store)?;
    if value != email_address {
        return Ok(Vec::new());
    }
    let mut matches = vec![MatchResult::new(field.primary, value)];
    for key in field.associated {
        let value = store.get_meta(id, key).await.or_raise(|| ErrorKind::Store)?;
        if !value.is_empty() {
            matches.push(MatchResult::new(*key, value));
        }
    }
    Ok(matches)
}
