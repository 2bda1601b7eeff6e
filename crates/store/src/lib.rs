//! Record store interface for the wcpt privacy tooling.
//!
//! The host content store owns records, their metadata, query execution and
//! permission checks. This crate models the small part of it the privacy
//! exporter depends on: a typed [`QuerySpec`](query::QuerySpec), the
//! [`RecordStore`] trait, and two implementations, an SQLite database and
//! (behind the `mock` feature) an in-memory store for tests.

pub mod backend;
pub mod error;
mod models;
pub mod query;

#[cfg(feature = "mock")]
pub use crate::backend::MockStore;
pub use crate::backend::{RecordStore, SqliteStore};
pub use crate::models::{Record, RecordId, Status};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn RecordStore + Send + Sync>;
