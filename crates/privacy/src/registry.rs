//! Registration of exporters and erasers.
//!
//! Callers of a data-subject access request don't know which subsystems hold
//! personal data; they ask the [`Registry`] to run every registered exporter
//! from page 1 until it reports `done`.

use crate::erase::{ErasePage, Eraser};
use crate::error::{ErrorKind, Result};
use crate::export::{ExportPage, Exporter, MatchResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// Identifier the application record exporter and eraser are registered under.
pub const EXPORTER_ID: &str = "wcb_speaker";
/// Human-readable name of the application record exporter and eraser.
pub const FRIENDLY_NAME: &str = "WordCamp Application Data";
/// Default cap on pages driven per exporter by [`Registry::export_all`].
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Anything that can export one page of personal data for an address.
#[async_trait]
pub trait PersonalDataExporter: Send + Sync {
    async fn export(&self, email_address: &str, page: u32) -> Result<ExportPage>;
}

/// Anything that can erase one page of personal data for an address.
#[async_trait]
pub trait PersonalDataEraser: Send + Sync {
    async fn erase(&self, email_address: &str, page: u32) -> Result<ErasePage>;
}

#[async_trait]
impl PersonalDataExporter for Exporter {
    async fn export(&self, email_address: &str, page: u32) -> Result<ExportPage> {
        Exporter::export(self, email_address, page).await
    }
}

#[async_trait]
impl PersonalDataEraser for Eraser {
    async fn erase(&self, email_address: &str, page: u32) -> Result<ErasePage> {
        Eraser::erase(self, email_address, page).await
    }
}

/// A registered callback and the name it's presented under.
pub struct Registration<T: ?Sized> {
    pub friendly_name: String,
    pub callback: Arc<T>,
}

/// Everything one exporter produced across all of its pages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExportReport {
    pub exporter: String,
    pub friendly_name: String,
    pub pages: u32,
    pub data: Vec<MatchResult>,
}

/// Exporters and erasers keyed by identifier.
///
/// Registering under an identifier that is already taken replaces the
/// earlier registration.
pub struct Registry {
    exporters: BTreeMap<String, Registration<dyn PersonalDataExporter>>,
    erasers: BTreeMap<String, Registration<dyn PersonalDataEraser>>,
    max_pages: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            exporters: BTreeMap::new(),
            erasers: BTreeMap::new(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Cap the pages [`export_all`](Self::export_all) requests per exporter.
    ///
    /// Guards against stores whose page count keeps moving while records are
    /// being added.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn register_exporter(
        &mut self,
        id: impl Into<String>,
        friendly_name: impl Into<String>,
        callback: Arc<dyn PersonalDataExporter>,
    ) {
        let id = id.into();
        let friendly_name = friendly_name.into();
        tracing::info!(id = %id, friendly_name = %friendly_name, "Registered personal data exporter");
        self.exporters.insert(id, Registration { friendly_name, callback });
    }

    pub fn register_eraser(
        &mut self,
        id: impl Into<String>,
        friendly_name: impl Into<String>,
        callback: Arc<dyn PersonalDataEraser>,
    ) {
        let id = id.into();
        let friendly_name = friendly_name.into();
        tracing::info!(id = %id, friendly_name = %friendly_name, "Registered personal data eraser");
        self.erasers.insert(id, Registration { friendly_name, callback });
    }

    pub fn exporters(&self) -> impl Iterator<Item = (&str, &Registration<dyn PersonalDataExporter>)> {
        self.exporters.iter().map(|(id, registration)| (id.as_str(), registration))
    }

    pub fn erasers(&self) -> impl Iterator<Item = (&str, &Registration<dyn PersonalDataEraser>)> {
        self.erasers.iter().map(|(id, registration)| (id.as_str(), registration))
    }

    /// Export a single page through the exporter registered as `id`.
    pub async fn export_page(&self, id: &str, email_address: &str, page: u32) -> Result<ExportPage> {
        let registration = self
            .exporters
            .get(id)
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotRegistered(id.to_string())))?;
        registration
            .callback
            .export(email_address, page)
            .await
            .map_err(|err| ErrorKind::exporter(id, err))
    }

    /// Erase a single page through the eraser registered as `id`.
    pub async fn erase_page(&self, id: &str, email_address: &str, page: u32) -> Result<ErasePage> {
        let registration = self
            .erasers
            .get(id)
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotRegistered(id.to_string())))?;
        registration
            .callback
            .erase(email_address, page)
            .await
            .map_err(|err| ErrorKind::eraser(id, err))
    }

    /// Run every registered exporter from page 1 until it reports `done`.
    ///
    /// The first failing exporter aborts the whole run; partial results are
    /// discarded.
    #[instrument(skip(self, email_address))]
    pub async fn export_all(&self, email_address: &str) -> Result<Vec<ExportReport>> {
        let mut reports = Vec::with_capacity(self.exporters.len());
        for (id, registration) in &self.exporters {
            let mut report = ExportReport {
                exporter: id.clone(),
                friendly_name: registration.friendly_name.clone(),
                pages: 0,
                data: Vec::new(),
            };
            loop {
                if report.pages >= self.max_pages {
                    exn::bail!(ErrorKind::PageLimit(id.clone(), self.max_pages));
                }
                report.pages += 1;
                let page = registration
                    .callback
                    .export(email_address, report.pages)
                    .await
                    .map_err(|err| ErrorKind::exporter(id.as_str(), err))?;
                report.data.extend(page.data);
                if page.done {
                    break;
                }
            }
            tracing::info!(exporter = %id, pages = report.pages, fields = report.data.len(), "Export complete");
            reports.push(report);
        }
        Ok(reports)
    }
}

/// Register the application record exporter.
pub fn register_personal_data_exporters(registry: &mut Registry, exporter: Exporter) {
    registry.register_exporter(EXPORTER_ID, FRIENDLY_NAME, Arc::new(exporter));
}

/// Register the application record eraser.
///
/// Erasure is a placeholder (see [`EraseOutcome`](crate::EraseOutcome)), so
/// this is only called when explicitly enabled.
pub fn register_personal_data_erasers(registry: &mut Registry, eraser: Eraser) {
    registry.register_eraser(EXPORTER_ID, FRIENDLY_NAME, Arc::new(eraser));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EraseOutcome;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wcpt_store::{MockStore, Record, StoreHandle};

    fn store(records: impl IntoIterator<Item = Record>) -> StoreHandle {
        Arc::new(MockStore::with_records(records))
    }

    /// Exporter that never finishes.
    struct Endless(AtomicU32);

    #[async_trait]
    impl PersonalDataExporter for Endless {
        async fn export(&self, _email_address: &str, page: u32) -> Result<ExportPage> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ExportPage {
                data: vec![MatchResult::new("page", page.to_string())],
                done: false,
            })
        }
    }

    /// Exporter whose store is unavailable.
    struct Unavailable;

    #[async_trait]
    impl PersonalDataExporter for Unavailable {
        async fn export(&self, _email_address: &str, _page: u32) -> Result<ExportPage> {
            exn::bail!(ErrorKind::Store)
        }
    }

    #[test]
    fn test_register_exporters() {
        let mut registry = Registry::new();
        register_personal_data_exporters(&mut registry, Exporter::new(store(Vec::new())));
        let registered: Vec<_> = registry.exporters().map(|(id, r)| (id, r.friendly_name.as_str())).collect();
        assert_eq!(registered, vec![("wcb_speaker", "WordCamp Application Data")]);
        assert_eq!(registry.erasers().count(), 0);
    }

    #[tokio::test]
    async fn test_export_all_drives_pagination() {
        let store = store((1..=41).map(|id| Record::new(id, "wordcamp").with_meta("Email Address", "a@x.com")));
        let mut registry = Registry::new();
        register_personal_data_exporters(&mut registry, Exporter::new(store));
        let reports = registry.export_all("a@x.com").await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].exporter, EXPORTER_ID);
        assert_eq!(reports[0].pages, 3);
        assert_eq!(reports[0].data.len(), 41);
    }

    #[tokio::test]
    async fn test_export_all_with_nothing_found() {
        let mut registry = Registry::new();
        register_personal_data_exporters(&mut registry, Exporter::new(store(Vec::new())));
        let reports = registry.export_all("a@x.com").await.unwrap();
        assert_eq!(reports[0].pages, 1);
        assert!(reports[0].data.is_empty());
    }

    #[tokio::test]
    async fn test_export_all_page_limit() {
        let endless = Arc::new(Endless(AtomicU32::new(0)));
        let mut registry = Registry::new().with_max_pages(5);
        registry.register_exporter("endless", "Endless", endless.clone());
        let err = registry.export_all("a@x.com").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PageLimit(id, 5) if id == "endless"));
        assert_eq!(endless.0.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_single_pages_by_id() {
        let store = store([Record::new(1, "wordcamp").with_meta("Email Address", "a@x.com")]);
        let mut registry = Registry::new();
        register_personal_data_exporters(&mut registry, Exporter::new(store.clone()));
        register_personal_data_erasers(&mut registry, Eraser::new(store));
        let export = registry.export_page(EXPORTER_ID, "a@x.com", 1).await.unwrap();
        assert_eq!(export.data, vec![MatchResult::new("Email Address", "a@x.com")]);
        let erase = registry.erase_page(EXPORTER_ID, "a@x.com", 1).await.unwrap();
        assert_eq!(erase.outcome, EraseOutcome::NotImplemented);
    }

    #[tokio::test]
    async fn test_store_failure_stays_retryable() {
        let mut registry = Registry::new();
        registry.register_exporter("unavailable", "Unavailable", Arc::new(Unavailable));
        let err = registry.export_page("unavailable", "a@x.com", 1).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Exporter { id, .. } if id == "unavailable"));
        assert!(err.is_retryable());
        let err = registry.export_all("a@x.com").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unregistered_id() {
        let registry = Registry::new();
        let err = registry.export_page("nope", "a@x.com", 1).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotRegistered(id) if id == "nope"));
        let err = registry.erase_page(EXPORTER_ID, "a@x.com", 1).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotRegistered(_)));
    }
}
