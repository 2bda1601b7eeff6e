//! In-memory record store for testing.

use crate::RecordStore;
use crate::error::Result;
use crate::models::{Record, RecordId};
use crate::query::{Order, QueryPage, QuerySpec};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory record store for testing.
///
/// Records are stored in a `BTreeMap` behind a [`RwLock`], so all trait
/// methods can operate on `&self` without external synchronisation. Queries
/// are answered with [`QuerySpec::matches`], the reference semantics other
/// stores are tested against.
///
/// # Examples
///
/// ```
/// use wcpt_store::{MockStore, Record, RecordStore};
/// use wcpt_store::query::QuerySpec;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::with_records([
///     Record::new(1, "wordcamp").with_meta("Email Address", "a@example.org"),
/// ]);
/// let page = store.query(&QuerySpec::new("wordcamp")).await?;
/// assert_eq!(page.records.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockStore {
    name: String,
    read_private: bool,
    records: RwLock<BTreeMap<RecordId, Record>>,
}

impl MockStore {
    /// Create a mock store pre-populated with records.
    ///
    /// Later records replace earlier ones with the same identifier.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = records.into_iter().map(|record| (record.id, record)).collect();
        Self {
            name: "mock".to_string(),
            read_private: false,
            records: RwLock::new(records),
        }
    }

    /// Change the name of the mock store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Let readable-permission queries see private records.
    pub fn with_read_private(mut self, read_private: bool) -> Self {
        self.read_private = read_private;
        self
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: Record) {
        self.records.write().await.insert(record.id, record);
    }

    /// Remove a record, returning it if it existed.
    pub async fn remove(&self, id: RecordId) -> Option<Record> {
        self.records.write().await.remove(&id)
    }
}
impl Default for MockStore {
    fn default() -> Self {
        let records: [Record; 0] = [];
        Self::with_records(records)
    }
}

#[async_trait]
impl RecordStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage> {
        spec.validate()?;
        let guard = self.records.read().await;
        let mut matching: Vec<RecordId> = guard
            .values()
            .filter(|record| spec.matches(record, self.read_private))
            .map(|record| record.id)
            .collect();
        if spec.order == Order::Descending {
            matching.reverse();
        }
        let found = matching.len() as u64;
        let offset = usize::try_from(spec.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(spec.per_page).unwrap_or(usize::MAX);
        let records = matching.into_iter().skip(offset).take(per_page).collect();
        Ok(QueryPage::new(records, found, spec.per_page))
    }

    async fn get_meta(&self, id: RecordId, key: &str) -> Result<String> {
        let guard = self.records.read().await;
        Ok(guard.get(&id).map(|record| record.meta(key).to_string()).unwrap_or_default())
    }
}
