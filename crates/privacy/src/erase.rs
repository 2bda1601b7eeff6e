//! Personal data erasure placeholder.
//!
//! Erasure follows the same page-bounded contract as export but has no
//! removal or retention policy yet. Every page is reported as
//! [`EraseOutcome::NotImplemented`] so callers can't mistake "nothing was
//! removed" for "there was nothing to remove".

use crate::catalog::FieldCatalog;
use crate::error::Result;
use crate::page::is_done;
use crate::query::fetch_records;
use crate::settings::Settings;
use derive_more::Display;
use tracing::instrument;
use wcpt_store::StoreHandle;

/// What the eraser did with a page.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum EraseOutcome {
    /// Erasure is not supported; no data was touched.
    #[display("not implemented")]
    NotImplemented,
}

/// One page of erasure results.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErasePage {
    pub items_removed: bool,
    pub items_retained: bool,
    pub messages: Vec<String>,
    pub done: bool,
    pub outcome: EraseOutcome,
}
impl ErasePage {
    fn not_implemented(done: bool) -> Self {
        Self {
            items_removed: false,
            items_retained: false,
            messages: Vec::new(),
            done,
            outcome: EraseOutcome::NotImplemented,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.outcome != EraseOutcome::NotImplemented
    }
}

/// Walks the same pages as the [`Exporter`](crate::Exporter) without
/// modifying anything.
#[derive(Clone)]
pub struct Eraser {
    store: StoreHandle,
    catalog: FieldCatalog,
    settings: Settings,
}

impl Eraser {
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

    #[instrument(skip(self, email_address), fields(store = self.store.name()))]
    pub async fn erase(&self, email_address: &str, page: u32) -> Result<ErasePage> {
        let result = fetch_records(&*self.store, &self.catalog, &self.settings, email_address, page).await?;
        tracing::warn!(candidates = result.records.len(), "Personal data erasure is not implemented; nothing removed");
        Ok(ErasePage::not_implemented(is_done(page, result.max_num_pages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldDefinition;
    use std::sync::Arc;
    use wcpt_store::{MockStore, Record, RecordId, RecordStore};

    #[tokio::test]
    async fn test_erase_is_a_placeholder() {
        let store = Arc::new(MockStore::with_records([Record::new(1, "wordcamp")
            .with_meta("Email Address", "a@x.com")
            .with_meta("Organizer Name", "Jane")]));
        let eraser = Eraser::new(store.clone());
        let page = eraser.erase("a@x.com", 1).await.unwrap();
        assert!(!page.items_removed);
        assert!(!page.items_retained);
        assert!(page.messages.is_empty());
        assert!(page.done);
        assert_eq!(page.outcome, EraseOutcome::NotImplemented);
        assert!(!page.is_supported());
        // Nothing was touched.
        assert_eq!(store.get_meta(RecordId(1), "Email Address").await.unwrap(), "a@x.com");
        assert_eq!(store.get_meta(RecordId(1), "Organizer Name").await.unwrap(), "Jane");
    }

    #[tokio::test]
    async fn test_erase_done_follows_pagination() {
        let store = Arc::new(MockStore::with_records(
            (1..=21).map(|id| Record::new(id, "wordcamp").with_meta("Email Address", "a@x.com")),
        ));
        let eraser = Eraser::new(store);
        assert!(!eraser.erase("a@x.com", 1).await.unwrap().done);
        assert!(eraser.erase("a@x.com", 2).await.unwrap().done);
    }

    #[tokio::test]
    async fn test_erase_with_no_candidates() {
        let eraser = Eraser::new(Arc::new(MockStore::default()));
        let page = eraser.erase("a@x.com", 1).await.unwrap();
        assert!(page.done);
        assert_eq!(page.outcome, EraseOutcome::NotImplemented);
    }

    #[tokio::test]
    async fn test_erase_with_custom_catalog() {
        const CONTACT_FIELDS: &[FieldDefinition] = &[FieldDefinition {
            primary: "Contact E-mail",
            associated: &[],
        }];
        let store = Arc::new(MockStore::with_records(
            (1..=21).map(|id| Record::new(id, "wordcamp").with_meta("Email Address", "a@x.com")),
        ));
        assert!(!Eraser::new(store.clone()).erase("a@x.com", 1).await.unwrap().done);
        // Records only match through the default catalog's keys.
        let eraser = Eraser::new(store).with_catalog(FieldCatalog::new(CONTACT_FIELDS));
        assert!(eraser.erase("a@x.com", 1).await.unwrap().done);
    }

    #[cfg(feature = "serde")]
    #[tokio::test]
    async fn test_page_json() {
        let eraser = Eraser::new(Arc::new(MockStore::default()));
        let page = eraser.erase("a@x.com", 1).await.unwrap();
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({
                "items_removed": false,
                "items_retained": false,
                "messages": [],
                "done": true,
                "outcome": "not_implemented",
            })
        );
    }
}
