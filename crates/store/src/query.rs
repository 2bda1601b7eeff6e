//! Typed query specification.
//!
//! A [`QuerySpec`] describes one page-bounded lookup against a
//! [`RecordStore`](crate::RecordStore): which content type, which statuses,
//! whose permissions, which page, and a set of metadata clauses combined by a
//! single [`Relation`]. Backends translate it into whatever their storage
//! understands; [`QuerySpec::matches`] is the reference semantics that every
//! backend must agree with.

use crate::error::{ErrorKind, Result};
use crate::models::{Record, RecordId, Status};
use std::collections::BTreeMap;

/// Page size used when a query doesn't ask for one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Which record statuses a query returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every status except the ones hidden from "any" (trash, auto-draft).
    #[default]
    Any,
    /// Only records with one of these statuses.
    Only(Vec<Status>),
}
impl StatusFilter {
    pub fn allows(&self, status: &Status) -> bool {
        match self {
            Self::Any => status.is_included_in_any(),
            Self::Only(statuses) => statuses.contains(status),
        }
    }
}

/// Permission check applied by the store before returning records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Only records the current caller is allowed to read.
    #[default]
    Readable,
    /// No permission filtering.
    Unchecked,
}

/// How a metadata clause compares the stored value to the clause value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    /// Stored value equals the clause value.
    Equals,
    /// Stored value contains the clause value as a literal substring,
    /// ignoring ASCII case.
    Like,
}

/// How the clauses of a [`MetaQuery`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    And,
    Or,
}

/// A single condition on a metadata key.
///
/// A record only satisfies a clause if it has a value stored under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaClause {
    pub key: String,
    pub value: String,
    pub compare: Compare,
}
impl MetaClause {
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into(), compare: Compare::Equals }
    }

    pub fn like(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into(), compare: Compare::Like }
    }

    /// Test the clause against a record's metadata.
    pub fn matches(&self, meta: &BTreeMap<String, String>) -> bool {
        let Some(stored) = meta.get(&self.key) else {
            return false;
        };
        match self.compare {
            Compare::Equals => *stored == self.value,
            Compare::Like => stored.to_ascii_lowercase().contains(&self.value.to_ascii_lowercase()),
        }
    }
}

/// A group of [`MetaClause`]s joined by one [`Relation`].
///
/// An empty group matches every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaQuery {
    pub relation: Relation,
    pub clauses: Vec<MetaClause>,
}
impl MetaQuery {
    pub fn new(relation: Relation) -> Self {
        Self { relation, clauses: Vec::new() }
    }

    pub fn with_clause(mut self, clause: MetaClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, meta: &BTreeMap<String, String>) -> bool {
        if self.clauses.is_empty() {
            return true;
        }
        match self.relation {
            Relation::And => self.clauses.iter().all(|clause| clause.matches(meta)),
            Relation::Or => self.clauses.iter().any(|clause| clause.matches(meta)),
        }
    }
}

/// Sort direction, always by record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Ascending,
    #[default]
    Descending,
}

/// One page-bounded query against a record store.
///
/// # Examples
///
/// ```
/// use wcpt_store::query::{MetaClause, MetaQuery, QuerySpec, Relation};
///
/// let spec = QuerySpec::new("wordcamp")
///     .with_per_page(20)
///     .with_page(2)
///     .with_meta_query(
///         MetaQuery::new(Relation::Or)
///             .with_clause(MetaClause::equals("Email Address", "a@example.org")),
///     );
/// assert_eq!(spec.offset(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub post_type: String,
    pub status: StatusFilter,
    pub permission: Permission,
    pub per_page: u32,
    /// 1-based page index. Anything below 1 is served as the first page.
    pub page: u32,
    pub order: Order,
    pub meta: MetaQuery,
}
impl QuerySpec {
    pub fn new(post_type: impl Into<String>) -> Self {
        Self {
            post_type: post_type.into(),
            status: StatusFilter::default(),
            permission: Permission::default(),
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            order: Order::default(),
            meta: MetaQuery::default(),
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn with_meta_query(mut self, meta: MetaQuery) -> Self {
        self.meta = meta;
        self
    }

    /// Reject specifications no backend can execute.
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            exn::bail!(ErrorKind::InvalidQuery("page size must be at least 1"));
        }
        if self.post_type.is_empty() {
            exn::bail!(ErrorKind::InvalidQuery("post type must not be empty"));
        }
        Ok(())
    }

    /// Number of records skipped before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page)
    }

    /// Reference semantics of the filter.
    ///
    /// `read_private` is the caller's permission level, only consulted when
    /// the query asks for [`Permission::Readable`].
    pub fn matches(&self, record: &Record, read_private: bool) -> bool {
        record.post_type == self.post_type
            && self.status.allows(&record.status)
            && (self.permission == Permission::Unchecked || read_private || !record.status.is_private())
            && self.meta.matches(&record.meta)
    }
}

/// A single page of query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPage {
    /// Records on this page, in query order.
    pub records: Vec<RecordId>,
    /// Total number of records matching the filter, across all pages.
    pub found: u64,
    /// Total number of pages for the filter at the query's page size.
    pub max_num_pages: u32,
}
impl QueryPage {
    pub fn new(records: Vec<RecordId>, found: u64, per_page: u32) -> Self {
        let pages = found.div_ceil(u64::from(per_page.max(1)));
        Self {
            records,
            found,
            max_num_pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }
}
