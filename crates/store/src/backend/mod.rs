//! Record store trait and implementations.
//!
//! This module defines the `RecordStore` trait, the narrow interface the
//! privacy tooling needs from the host content store: run a page-bounded
//! [`QuerySpec`] and read single metadata values. Query execution, indexing
//! and permission enforcement all belong to the implementation.

#[cfg(feature = "mock")]
mod mock;
mod sqlite;

#[cfg(feature = "mock")]
pub use self::mock::MockStore;
pub use self::sqlite::SqliteStore;
use crate::error::Result;
use crate::models::RecordId;
use crate::query::{QueryPage, QuerySpec};
use async_trait::async_trait;

/// Unified interface for record stores.
///
/// # Examples
///
/// ```
/// use wcpt_store::{RecordStore, error::Result};
/// use wcpt_store::query::{MetaClause, MetaQuery, QuerySpec, Relation};
///
/// async fn first_match(store: &dyn RecordStore, email: &str) -> Result<Option<String>> {
///     let spec = QuerySpec::new("wordcamp").with_meta_query(
///         MetaQuery::new(Relation::Or).with_clause(MetaClause::equals("Email Address", email)),
///     );
///     let page = store.query(&spec).await?;
///     match page.records.first() {
///         Some(id) => Ok(Some(store.get_meta(*id, "Organizer Name").await?)),
///         None => Ok(None),
///     }
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name of the configured store, used for logging only.
    fn name(&self) -> &str;

    /// Run a page-bounded query.
    ///
    /// Returns the identifiers of the records on the requested page, in the
    /// query's order, along with the total page count for the filter.
    /// Requesting a page past the end returns an empty page with the same
    /// total page count.
    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage>;

    /// Read a single metadata value.
    ///
    /// Returns an empty string when the record has no value under `key` (or
    /// when the record doesn't exist at all); absence is never an error.
    async fn get_meta(&self, id: RecordId, key: &str) -> Result<String>;
}
